//! Per-request match values.
//!
//! # Responsibilities
//! - Pair a matched route with its decoded captures
//! - Split off the unnamed wildcard as the traversal remainder
//!
//! # Design Decisions
//! - Borrows the route; a match never outlives the router
//! - Named wildcards (`*path`) stay in the params as plain values

use std::fmt;

use crate::pattern::{ParamValue, Params, WILDCARD_KEY};
use crate::routing::route::Route;

/// One candidate produced by [`Router::matches`](crate::routing::Router::matches).
pub struct Match<'r, H> {
    route: &'r Route<H>,
    wildcard: Option<Vec<String>>,
    params: Params,
}

impl<'r, H> Match<'r, H> {
    pub(crate) fn new(route: &'r Route<H>, mut params: Params) -> Self {
        let wildcard = match params.remove(WILDCARD_KEY) {
            Some(ParamValue::Segments(segments)) => Some(segments),
            Some(ParamValue::Segment(segment)) => Some(vec![segment]),
            None => None,
        };
        Self {
            route,
            wildcard,
            params,
        }
    }

    pub fn route(&self) -> &'r Route<H> {
        self.route
    }

    /// Segments captured by the unnamed wildcard, if the pattern has one.
    pub fn wildcard(&self) -> Option<&[String]> {
        self.wildcard.as_deref()
    }

    /// Named captures, in pattern order.
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn into_parts(self) -> (&'r Route<H>, Option<Vec<String>>, Params) {
        (self.route, self.wildcard, self.params)
    }
}

impl<H> fmt::Debug for Match<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Match")
            .field("route", &self.route.pattern())
            .field("wildcard", &self.wildcard)
            .field("params", &self.params)
            .finish()
    }
}
