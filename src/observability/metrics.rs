//! Routing metrics.
//!
//! # Metrics
//! - `waypoint_matches_total` (counter): dispatched requests by route
//! - `waypoint_not_found_total` (counter): paths no route could serve
//! - `waypoint_candidates_skipped_total` (counter): candidates passed over, by reason
//! - `waypoint_encoding_cache_total` (counter): encoding cache lookups, by result

use metrics::counter;

pub fn record_match(route: &str) {
    counter!("waypoint_matches_total", "route" => route.to_string()).increment(1);
}

pub fn record_not_found() {
    counter!("waypoint_not_found_total").increment(1);
}

pub fn record_candidate_skipped(reason: &'static str) {
    counter!("waypoint_candidates_skipped_total", "reason" => reason).increment(1);
}

pub fn record_encoding_cache(result: &'static str) {
    counter!("waypoint_encoding_cache_total", "result" => result).increment(1);
}
