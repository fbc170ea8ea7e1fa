//! Route table and ordered multi-match.
//!
//! # Responsibilities
//! - Store routes in registration order
//! - Yield every route matching a path, lazily, in that order
//! - Reverse-generate paths by route name
//!
//! # Design Decisions
//! - Registration needs `&mut Router`; lookups need `&Router`, so a built
//!   router is shared behind `Arc` with no locking
//! - Combined expression over all routes rejects hopeless paths in one
//!   evaluation; it is rebuilt lazily after registration invalidates it
//! - Routes whose fragments carry their own groups or backreferences stay
//!   out of the combined expression and are always evaluated
//! - Empty table yields an empty sequence, not an error

use std::fmt;
use std::slice;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use fancy_regex::Regex;

use crate::dispatch::resolver::Traverser;
use crate::pattern::{Params, PatternCompiler, PatternResult};
use crate::routing::matcher::Match;
use crate::routing::route::{Route, RouteError};

/// Ordered set of routes.
pub struct Router<H> {
    compiler: PatternCompiler,
    routes: Vec<Route<H>>,
    traverser: Option<Arc<dyn Traverser>>,
    combined: ArcSwapOption<CombinedMatcher>,
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for Router<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes)
            .field("traverser", &self.traverser)
            .finish()
    }
}

impl<H> Router<H> {
    pub fn new() -> Self {
        Self::with_compiler(PatternCompiler::default())
    }

    pub fn with_compiler(compiler: PatternCompiler) -> Self {
        Self {
            compiler,
            routes: Vec::new(),
            traverser: None,
            combined: ArcSwapOption::empty(),
        }
    }

    /// Traverser given to routes registered from now on.
    pub fn with_traverser(mut self, traverser: Arc<dyn Traverser>) -> Self {
        self.traverser = Some(traverser);
        self
    }

    /// Register `pattern` after every existing route.
    ///
    /// The pattern is compiled immediately; a syntax error leaves the
    /// table unchanged.
    pub fn connect(&mut self, pattern: &str) -> PatternResult<&mut Route<H>> {
        let compiled = self.compiler.compile(pattern)?;
        let mut route = Route::new(compiled);
        if let Some(traverser) = &self.traverser {
            route.traverse_with(traverser.clone());
        }

        self.combined.store(None);
        self.routes.push(route);
        tracing::info!(pattern, priority = self.routes.len() - 1, "Route registered");

        let index = self.routes.len() - 1;
        Ok(&mut self.routes[index])
    }

    pub fn routes(&self) -> &[Route<H>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn compiler(&self) -> &PatternCompiler {
        &self.compiler
    }

    /// First route registered under `name`.
    pub fn route(&self, name: &str) -> Option<&Route<H>> {
        self.routes.iter().find(|r| r.name() == Some(name))
    }

    /// Generate the path of the route registered under `name`.
    pub fn path(&self, name: &str, params: &Params) -> Result<String, RouteError> {
        self.route(name)
            .ok_or_else(|| RouteError::UnknownRoute(name.to_string()))?
            .path(params)
    }

    /// Every route matching `path`, in registration order.
    ///
    /// Each call returns a fresh sequence; routes are only evaluated as the
    /// sequence is consumed.
    pub fn matches<'r, 'p>(&'r self, path: &'p str) -> Matches<'r, 'p, H> {
        let rejected = !self.routes.is_empty() && !self.combined().may_match(path);
        if rejected {
            tracing::debug!(path, "Rejected by combined matcher");
        }
        Matches {
            routes: self.routes.iter(),
            path,
            rejected,
        }
    }

    /// Highest priority match for `path`.
    pub fn first(&self, path: &str) -> Option<Match<'_, H>> {
        self.matches(path).next()
    }

    fn combined(&self) -> Arc<CombinedMatcher> {
        if let Some(combined) = self.combined.load_full() {
            return combined;
        }
        let combined = Arc::new(CombinedMatcher::build(&self.routes));
        self.combined.store(Some(combined.clone()));
        combined
    }
}

/// Lazy sequence of matches for one path.
pub struct Matches<'r, 'p, H> {
    routes: slice::Iter<'r, Route<H>>,
    path: &'p str,
    // combined matcher said no; only uncombined routes are left to try
    rejected: bool,
}

impl<'r, H> Iterator for Matches<'r, '_, H> {
    type Item = Match<'r, H>;

    fn next(&mut self) -> Option<Self::Item> {
        for route in self.routes.by_ref() {
            if self.rejected && route.compiled().is_combinable() {
                continue;
            }
            match route.captures(self.path) {
                Some(params) => {
                    tracing::debug!(path = self.path, pattern = route.pattern(), "Route matched");
                    return Some(Match::new(route, params));
                }
                None => {
                    tracing::trace!(path = self.path, pattern = route.pattern(), "Route skipped");
                }
            }
        }
        None
    }
}

/// One expression accepting any path some combinable route accepts.
struct CombinedMatcher {
    regex: Option<Regex>,
}

impl CombinedMatcher {
    fn build<H>(routes: &[Route<H>]) -> Self {
        let alternatives = routes
            .iter()
            .filter(|r| r.compiled().is_combinable())
            .map(|r| format!("(?:{})", r.compiled().expression()))
            .collect::<Vec<_>>();
        if alternatives.is_empty() {
            return Self { regex: None };
        }
        let expression = format!("^(?:{})$", alternatives.join("|"));

        // caller fragments may not combine (e.g. repeated group names)
        let regex = match Regex::new(&expression) {
            Ok(regex) => Some(regex),
            Err(err) => {
                tracing::warn!(error = %err, "Combined matcher unavailable, evaluating routes one by one");
                None
            }
        };
        Self { regex }
    }

    fn may_match(&self, path: &str) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(path).unwrap_or(true),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns<H>(matches: Matches<'_, '_, H>) -> Vec<String> {
        matches.map(|m| m.route().pattern().to_string()).collect()
    }

    #[test]
    fn test_ordered_overlapping_matches() {
        let mut router: Router<()> = Router::new();
        for pattern in ["/test", "/:test", "/no-match/:test", "/te:match"] {
            router.connect(pattern).unwrap();
        }
        assert_eq!(
            patterns(router.matches("/test")),
            vec!["/test", "/:test", "/te:match"]
        );
    }

    #[test]
    fn test_empty_router() {
        let router: Router<()> = Router::new();
        assert_eq!(router.matches("/path").count(), 0);
        assert!(router.first("/").is_none());
    }

    #[test]
    fn test_sequences_are_independent() {
        let mut router: Router<()> = Router::new();
        router.connect("/a").unwrap();
        router.connect("/:x").unwrap();

        let mut first = router.matches("/a");
        assert!(first.next().is_some());
        let second = router.matches("/a");
        assert_eq!(second.count(), 2);
        assert_eq!(first.count(), 1);
    }

    #[test]
    fn test_mapper_examples() {
        let mut router: Router<()> = Router::new();
        for pattern in ["/", "/*/manage", "/search/:term", "/rest/:kind/:id", "/*"] {
            router.connect(pattern).unwrap();
        }

        let m = router.first("/").unwrap();
        assert_eq!(m.route().pattern(), "/");
        assert!(m.wildcard().is_none());
        assert!(m.params().is_empty());

        let m = router.first("/front-page").unwrap();
        assert_eq!(m.route().pattern(), "/*");
        assert_eq!(m.wildcard(), Some(&["front-page".to_string()][..]));

        let m = router.first("/search/abc").unwrap();
        assert_eq!(m.params().get_str("term"), Some("abc"));

        let m = router.first("/front-page/manage").unwrap();
        assert_eq!(m.route().pattern(), "/*/manage");
        assert_eq!(m.wildcard(), Some(&["front-page".to_string()][..]));

        let m = router.first("/rest/doc/123").unwrap();
        assert_eq!(m.params().get_str("kind"), Some("doc"));
        assert_eq!(m.params().get_str("id"), Some("123"));
    }

    #[test]
    fn test_combined_matcher_invalidated_on_connect() {
        let mut router: Router<()> = Router::new();
        router.connect("/a").unwrap();
        assert_eq!(router.matches("/b").count(), 0);

        router.connect("/b").unwrap();
        assert_eq!(router.matches("/b").count(), 1);
    }

    #[test]
    fn test_uncombinable_fragments_still_match() {
        let mut router: Router<()> = Router::new();
        router.connect("/(?P<v>x)").unwrap();
        router.connect("/(?P<v>y)").unwrap();
        assert_eq!(router.matches("/y").count(), 1);
        assert_eq!(router.matches("/z").count(), 0);
    }

    #[test]
    fn test_backreference_routes_bypass_combined_matcher() {
        let mut router: Router<()> = Router::new();
        router.connect("/(x)y").unwrap();
        router.connect(r"/(a)\1").unwrap();
        router.connect("/plain").unwrap();

        assert!(router.routes()[1].captures("/aa").is_some());
        assert_eq!(patterns(router.matches("/aa")), vec![r"/(a)\1"]);
        assert_eq!(patterns(router.matches("/xy")), vec!["/(x)y"]);
        assert_eq!(patterns(router.matches("/plain")), vec!["/plain"]);
        assert_eq!(router.matches("/ab").count(), 0);
    }

    #[test]
    fn test_syntax_error_leaves_table_unchanged() {
        let mut router: Router<()> = Router::new();
        assert!(router.connect("/*a/*b").is_err());
        assert!(router.is_empty());
    }

    #[test]
    fn test_reverse_by_name() {
        let mut router: Router<()> = Router::new();
        router.connect("/users/:id").unwrap().named("user");
        let params = Params::new().with("id", "42");
        assert_eq!(router.path("user", &params).unwrap(), "/users/42");
        assert_eq!(
            router.path("nope", &params),
            Err(RouteError::UnknownRoute("nope".into()))
        );
    }

    #[test]
    fn test_router_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Router<Arc<dyn Fn() + Send + Sync>>>();
    }
}
