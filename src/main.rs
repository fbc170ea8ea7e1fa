//! `waypoint` command line.
//!
//! ```text
//! waypoint --config routes.toml check
//! waypoint --config routes.toml match /docs/math/pi
//! waypoint --config routes.toml generate user id=42
//! waypoint --config routes.toml serve-path /users/42
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use waypoint::config::load_config;
use waypoint::observability::logging;
use waypoint::pattern::{ParamValue, Params, WILDCARD_KEY};
use waypoint::{Application, Request};

#[derive(Parser)]
#[command(name = "waypoint")]
#[command(about = "Inspect and exercise a routing table", long_about = None)]
struct Cli {
    /// Routing table (TOML)
    #[arg(short, long, default_value = "waypoint.toml")]
    config: PathBuf,

    /// Overrides the configured log level
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the routing table
    Check,
    /// List every route matching a path, in priority order
    Match { path: String },
    /// Generate the path of a named route
    Generate {
        route: String,
        /// Captures as key=value; `*=a/b` fills the unnamed wildcard
        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Serve a path with the configured route bodies
    ServePath { path: String },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    let level = cli.log_level.as_deref().unwrap_or(&config.observability.log_level);
    logging::init(level)?;
    tracing::info!(
        path = %cli.config.display(),
        routes = config.routes.len(),
        "Configuration loaded"
    );

    let app = Application::from_config(&config)?;

    match cli.command {
        Commands::Check => {
            println!("ok: {} routes", app.router().len());
        }
        Commands::Match { path } => {
            let candidates: Vec<_> = app
                .router()
                .matches(&path)
                .map(|m| {
                    json!({
                        "route": m.route().name(),
                        "pattern": m.route().pattern(),
                        "wildcard": m.wildcard(),
                        "params": m.params(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&candidates)?);
        }
        Commands::Generate { route, params } => {
            let params: Params = params
                .into_iter()
                .map(|(key, value)| {
                    if key == "*" {
                        let segments = value.split('/').filter(|s| !s.is_empty()).map(str::to_string);
                        (WILDCARD_KEY.to_string(), ParamValue::Segments(segments.collect()))
                    } else {
                        (key, ParamValue::Segment(value))
                    }
                })
                .collect();
            println!("{}", app.router().path(&route, &params)?);
        }
        Commands::ServePath { path } => {
            let response = app.handle(&Request::new(path));
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
