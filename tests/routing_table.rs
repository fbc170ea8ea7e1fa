//! Router and pattern behaviour through the public API.

mod common;

use std::sync::Arc;

use proptest::prelude::*;

use waypoint::dispatch::{Dispatcher, TreeTraverser};
use waypoint::pattern::{CompileOptions, ParamValue, Params, PatternCompiler, WILDCARD_KEY};
use waypoint::routing::Router;

fn segments(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_root_matches_root() {
    let pattern = PatternCompiler::default().compile("/").unwrap();
    assert_eq!(pattern.captures("/"), Some(Params::new()));
    assert_eq!(pattern.captures("/x"), None);
}

#[test]
fn test_wildcard_round_trip() {
    let pattern = PatternCompiler::default().compile("/*").unwrap();
    let params = pattern.captures("/a/b").unwrap();
    assert_eq!(
        params.get(WILDCARD_KEY),
        Some(&ParamValue::Segments(segments(&["a", "b"])))
    );
    assert_eq!(pattern.generate(&params).unwrap(), "/a/b");
}

#[test]
fn test_wildcard_then_segment() {
    let mut router: Router<()> = Router::new();
    router.connect("/docs/*/:name").unwrap();
    let m = router.first("/docs/math/pi").unwrap();
    assert_eq!(m.wildcard(), Some(&segments(&["math"])[..]));
    assert_eq!(m.params().get_str("name"), Some("pi"));
}

#[test]
fn test_overlapping_routes_in_registration_order() {
    let mut router: Router<()> = Router::new();
    for pattern in ["/test", "/:test", "/no-match/:test", "/te:match"] {
        router.connect(pattern).unwrap();
    }
    let patterns: Vec<_> = router.matches("/test").map(|m| m.route().pattern()).collect();
    assert_eq!(patterns, vec!["/test", "/:test", "/te:match"]);

    let m = router.matches("/test").nth(2).unwrap();
    assert_eq!(m.params().get_str("match"), Some("st"));
}

#[test]
fn test_trailing_slash_generation() {
    let compiler = PatternCompiler::default();
    let with_slash = compiler.compile("/docs/:name/").unwrap();
    let without = compiler.compile("/docs/*").unwrap();

    let params = Params::new().with("name", "a");
    assert_eq!(with_slash.generate(&params).unwrap(), "/docs/a/");

    let params = Params::new().with(WILDCARD_KEY, "a/b/");
    assert_eq!(without.generate(&params).unwrap(), "/docs/a/b");
    assert_eq!(without.generate(&Params::new()).unwrap(), "/docs");
}

#[test]
fn test_strict_segments() {
    let lenient = PatternCompiler::default().compile("/users/:id").unwrap();
    assert_eq!(lenient.captures("/users/").unwrap().get_str("id"), Some(""));

    let strict = PatternCompiler::new(CompileOptions { strict_segments: true }, 0)
        .compile("/users/:id")
        .unwrap();
    assert!(strict.captures("/users/").is_none());
}

#[test]
fn test_shared_router_across_threads() {
    let catalog = common::catalog();
    let root = common::library(&catalog);

    let mut router = Router::new().with_traverser(Arc::new(TreeTraverser::with_root(root)));
    router
        .connect("/*")
        .unwrap()
        .handle_type(catalog.document, "document")
        .handle_type(catalog.folder, "folder");
    let router = Arc::new(router);
    let dispatcher = Dispatcher::new(catalog.hierarchy.clone());

    let workers: Vec<_> = ["/math/pi", "/math/plot", "/math", "/empty"]
        .into_iter()
        .map(|path| {
            let router = router.clone();
            let dispatcher = dispatcher.clone();
            std::thread::spawn(move || dispatcher.dispatch(&router, path).map(|b| b.handler))
        })
        .collect();

    let handlers: Vec<_> = workers
        .into_iter()
        .map(|w| w.join().unwrap().unwrap())
        .collect();
    assert_eq!(handlers, vec!["document", "document", "folder", "folder"]);
}

fn value() -> impl Strategy<Value = String> {
    "\\PC{0,12}"
}

proptest! {
    #[test]
    fn prop_generate_then_match_is_identity(
        template in prop::sample::select(vec![
            "/:a/:b",
            "/users/:a/items/:b/",
            "/v1/:a/and/:b",
        ]),
        a in value(),
        b in value(),
    ) {
        let pattern = PatternCompiler::default().compile(template).unwrap();
        let params = Params::new().with("a", a).with("b", b);
        let path = pattern.generate(&params).unwrap();
        prop_assert_eq!(pattern.captures(&path), Some(params));
    }
}
