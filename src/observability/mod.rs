//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! pattern / routing / dispatch / app
//!     → logging.rs (tracing subscriber, installed by the binary)
//!     → metrics.rs (counters through the `metrics` facade)
//! ```
//!
//! # Design Decisions
//! - The library only emits; installing a subscriber or recorder is left
//!   to the embedding program
//! - Counters are cheap no-ops when no recorder is installed

pub mod logging;
pub mod metrics;
