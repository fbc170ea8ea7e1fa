//! Request handling over a router of controllers.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::app::response::Response;
use crate::config::schema::{AppConfig, WaypointConfig};
use crate::dispatch::{Dispatcher, Resource, TraversalError, Traverser, TypeHierarchy, TypeTag};
use crate::observability::metrics;
use crate::pattern::{ParamValue, Params, PatternResult};
use crate::routing::{Route, Router};

/// An incoming request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    path: String,
}

impl Request {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Everything a controller is called with.
#[derive(Debug)]
pub struct Invocation<'a> {
    pub request: &'a Request,
    /// Resource the wildcard remainder resolved to.
    pub context: Option<&'a Arc<dyn Resource>>,
    /// Captures left after traversal.
    pub params: &'a Params,
}

impl Invocation<'_> {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get_str(key)
    }

    /// The context, if it is a `T`.
    pub fn context_as<T: Resource>(&self) -> Option<&T> {
        self.context.and_then(|c| c.downcast_ref::<T>())
    }
}

/// Ways a controller can decline a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// Access denied; later candidates may still serve the path.
    #[error("access denied: {0}")]
    Forbidden(String),

    /// This controller does not serve the request; try the next candidate.
    #[error("not found")]
    NotFound,

    #[error("controller failed: {0}")]
    Failed(String),
}

pub type Controller = Arc<dyn Fn(&Invocation<'_>) -> Result<Response, HandlerError> + Send + Sync>;

/// Wrap a closure as a [`Controller`].
pub fn controller<F>(f: F) -> Controller
where
    F: Fn(&Invocation<'_>) -> Result<Response, HandlerError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// The wildcard remainder itself, for routes without an object tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    segments: Vec<String>,
}

impl Location {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl Resource for Location {
    fn type_tag(&self) -> TypeTag {
        TypeTag::ANY
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Resolves any remainder to a [`Location`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LocationTraverser;

impl Traverser for LocationTraverser {
    fn resolve(
        &self,
        remainder: &[String],
        _params: &mut Params,
    ) -> Result<Arc<dyn Resource>, TraversalError> {
        Ok(Arc::new(Location {
            segments: remainder.to_vec(),
        }))
    }

    fn reverse(&self, context: &dyn Resource) -> Result<Vec<String>, TraversalError> {
        context
            .as_any()
            .downcast_ref::<Location>()
            .map(|l| l.segments.clone())
            .ok_or(TraversalError::Unlocated)
    }
}

/// Routes requests to controllers.
pub struct Application {
    router: Router<Controller>,
    dispatcher: Dispatcher,
    config: AppConfig,
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("router", &self.router)
            .field("config", &self.config)
            .finish()
    }
}

impl Application {
    pub fn new(hierarchy: Arc<TypeHierarchy>, config: AppConfig) -> Self {
        Self::with_router(Router::new(), hierarchy, config)
    }

    pub fn with_router(
        router: Router<Controller>,
        hierarchy: Arc<TypeHierarchy>,
        config: AppConfig,
    ) -> Self {
        Self {
            router,
            dispatcher: Dispatcher::new(hierarchy),
            config,
        }
    }

    /// Build an application serving each configured route with its body.
    ///
    /// `{name}` in a body is replaced by the capture `name`, `{*}` by the
    /// wildcard remainder.
    pub fn from_config(config: &WaypointConfig) -> PatternResult<Self> {
        let mut router = Router::with_compiler(config.router.compiler())
            .with_traverser(Arc::new(LocationTraverser));
        for route in &config.routes {
            let body = route.body.clone();
            router
                .connect(&route.pattern)?
                .named(route.name.clone())
                .handle(controller(move |invocation| Ok(Response::ok(render(&body, invocation)))));
        }
        Ok(Self::with_router(
            router,
            Arc::new(TypeHierarchy::new()),
            config.application.clone(),
        ))
    }

    /// Register a route after every existing one.
    pub fn route(&mut self, pattern: &str) -> PatternResult<&mut Route<Controller>> {
        self.router.connect(pattern)
    }

    pub fn router(&self) -> &Router<Controller> {
        &self.router
    }

    pub fn hierarchy(&self) -> &Arc<TypeHierarchy> {
        self.dispatcher.hierarchy()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn handle(&self, request: &Request) -> Response {
        let span = tracing::debug_span!("handle", path = request.path());
        let _enter = span.enter();

        let path = request.path();
        let mut denied = false;

        for candidate in self.router.matches(path) {
            let bound = match self.dispatcher.resolve(candidate) {
                Ok(bound) => bound,
                Err(err) if err.is_retryable() => {
                    tracing::debug!(error = %err, "Candidate skipped");
                    metrics::record_candidate_skipped(err.reason());
                    continue;
                }
                Err(err) => {
                    tracing::error!(error = %err, "Request cannot be dispatched");
                    return Response::internal_error(err.to_string());
                }
            };

            let invocation = Invocation {
                request,
                context: bound.context.as_ref(),
                params: &bound.params,
            };
            match (bound.handler)(&invocation) {
                Ok(response) => {
                    metrics::record_match(&bound.pattern);
                    return response;
                }
                Err(HandlerError::NotFound) => {
                    tracing::debug!(pattern = %bound.pattern, "Controller declined");
                    metrics::record_candidate_skipped("controller_not_found");
                }
                Err(HandlerError::Forbidden(reason)) if self.config.retry_on_forbidden => {
                    tracing::warn!(pattern = %bound.pattern, %reason, "Access denied, trying next route");
                    metrics::record_candidate_skipped("forbidden");
                    denied = true;
                }
                Err(HandlerError::Forbidden(reason)) => {
                    tracing::warn!(pattern = %bound.pattern, %reason, "Access denied");
                    return Response::forbidden();
                }
                Err(HandlerError::Failed(reason)) => {
                    tracing::error!(pattern = %bound.pattern, %reason, "Controller failed");
                    return Response::internal_error(reason);
                }
            }
        }

        if denied {
            return Response::forbidden();
        }
        if self.config.redirect_trailing_slash {
            if let Some(location) = self.slash_toggled(path) {
                tracing::debug!(%location, "Redirecting");
                return Response::redirect(location);
            }
        }
        metrics::record_not_found();
        Response::not_found()
    }

    /// The path with its trailing slash toggled, if that form dispatches.
    ///
    /// The check is a full dispatch, so a traversing route walks the tree
    /// and fires its traversal events even though only a redirect is sent.
    fn slash_toggled(&self, path: &str) -> Option<String> {
        let toggled = match path.strip_suffix('/') {
            Some(stripped) => stripped.to_string(),
            None => format!("{path}/"),
        };
        if toggled.is_empty() {
            return None;
        }
        // only redirect to a path that would actually be served
        self.dispatcher
            .dispatch(&self.router, &toggled)
            .ok()
            .map(|_| toggled)
    }
}

fn render(template: &str, invocation: &Invocation<'_>) -> String {
    let mut body = template.to_string();
    for (key, value) in invocation.params.iter() {
        let text = match value {
            ParamValue::Segment(segment) => segment.clone(),
            ParamValue::Segments(segments) => segments.join("/"),
        };
        body = body.replace(&format!("{{{key}}}"), &text);
    }
    if let Some(location) = invocation.context_as::<Location>() {
        body = body.replace("{*}", &location.segments.join("/"));
    }
    body
}
