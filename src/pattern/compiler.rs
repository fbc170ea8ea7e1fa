//! Pattern compilation into a matcher and a generator.
//!
//! # Responsibilities
//! - Synthesize an anchored expression from the parsed tokens
//! - Decode captures into [`Params`] on match
//! - Rebuild a canonical path from [`Params`] (the inverse)
//!
//! # Design Decisions
//! - `:name` matches `[^/]*` (`[^/]+` when strict)
//! - Wildcards match `.*?` so literal text after them still anchors
//! - Capture groups get generated names (`__p0`, `__p1`, ...) so caller
//!   fragments with their own groups never shift our captures
//! - Backed by `fancy-regex` so look-around fragments are supported

use std::fmt;
use std::sync::Arc;

use fancy_regex::Regex;
use thiserror::Error;

use crate::pattern::encoding::{unquote, EncodingCache, SafeSet};
use crate::pattern::grammar::{self, ParsedPattern, PatternResult, PatternSyntaxError, Token};
use crate::pattern::params::{ParamValue, Params};

/// Capacity of the encoding cache when none is configured.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

const SEGMENT_EXPR: &str = "[^/]*";
const STRICT_SEGMENT_EXPR: &str = "[^/]+";
const WILDCARD_EXPR: &str = ".*?";

/// Errors raised while generating a path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("missing value for `{0}`")]
    MissingParam(String),

    #[error("`{0}` takes a single segment, got a sequence")]
    ExpectedSegment(String),
}

/// Knobs that change the synthesized expression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Reject empty `:name` captures.
    pub strict_segments: bool,
}

/// Compiles patterns, sharing one encoding cache between them.
#[derive(Debug, Clone)]
pub struct PatternCompiler {
    options: CompileOptions,
    cache: Arc<EncodingCache>,
}

impl Default for PatternCompiler {
    fn default() -> Self {
        Self::new(CompileOptions::default(), DEFAULT_CACHE_CAPACITY)
    }
}

impl PatternCompiler {
    pub fn new(options: CompileOptions, cache_capacity: usize) -> Self {
        Self {
            options,
            cache: Arc::new(EncodingCache::new(cache_capacity)),
        }
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    /// Compile `pattern`. Compiling the same pattern twice yields the same
    /// expression.
    pub fn compile(&self, pattern: &str) -> PatternResult<CompiledPattern> {
        let parsed = grammar::parse(pattern)?;
        let segment_expr = if self.options.strict_segments {
            STRICT_SEGMENT_EXPR
        } else {
            SEGMENT_EXPR
        };

        let mut capturing = String::from("^(?:");
        let mut bare = String::new();
        let mut slots = Vec::new();
        let mut pieces = Vec::new();
        let mut combinable = true;

        for (index, token) in parsed.tokens().iter().enumerate() {
            match token {
                Token::Literal(raw) => {
                    combinable &= !has_group_references(raw);
                    capturing.push_str(raw);
                    bare.push_str(raw);
                    pieces.push(Piece::Text(literal_text(raw)));
                }
                Token::Segment(name) => {
                    let group = format!("__p{index}");
                    capturing.push_str(&format!("(?P<{group}>{segment_expr})"));
                    bare.push_str(segment_expr);
                    slots.push(Slot { group, key: name.clone(), wildcard: false });
                    pieces.push(Piece::Segment(name.clone()));
                }
                Token::Wildcard(_) => {
                    let group = format!("__p{index}");
                    let key = token.key().unwrap_or(grammar::WILDCARD_KEY).to_string();
                    capturing.push_str(&format!("(?P<{group}>{WILDCARD_EXPR})"));
                    bare.push_str(WILDCARD_EXPR);
                    slots.push(Slot { group, key: key.clone(), wildcard: true });
                    pieces.push(Piece::Wildcard(key));
                }
            }
        }
        capturing.push_str(")$");

        let regex = Regex::new(&capturing).map_err(|err| PatternSyntaxError::Regex {
            pattern: pattern.to_string(),
            reason: err.to_string(),
        })?;

        tracing::debug!(pattern, expression = %capturing, "Pattern compiled");

        Ok(CompiledPattern {
            parsed,
            regex,
            expression: bare,
            slots,
            pieces,
            combinable,
            cache: self.cache.clone(),
        })
    }
}

#[derive(Debug)]
struct Slot {
    group: String,
    key: String,
    wildcard: bool,
}

#[derive(Debug)]
enum Piece {
    Text(String),
    Segment(String),
    Wildcard(String),
}

/// A pattern ready for matching and generation.
pub struct CompiledPattern {
    parsed: ParsedPattern,
    regex: Regex,
    expression: String,
    slots: Vec<Slot>,
    pieces: Vec<Piece>,
    combinable: bool,
    cache: Arc<EncodingCache>,
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("source", &self.parsed.source())
            .field("expression", &self.expression)
            .finish()
    }
}

impl CompiledPattern {
    /// The pattern as written.
    pub fn source(&self) -> &str {
        self.parsed.source()
    }

    pub fn parsed(&self) -> &ParsedPattern {
        &self.parsed
    }

    /// Unanchored expression without capture groups, for combining with
    /// other patterns.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn wildcard_key(&self) -> Option<&str> {
        self.parsed.wildcard_key()
    }

    /// False when caller fragments open capture groups or refer back to
    /// one; [`expression`](Self::expression) then only holds inside this
    /// pattern's own regex.
    pub fn is_combinable(&self) -> bool {
        self.combinable
    }

    /// Match `path` end to end, returning the decoded captures.
    pub fn captures(&self, path: &str) -> Option<Params> {
        let caps = match self.regex.captures(path) {
            Ok(Some(caps)) => caps,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(
                    pattern = %self.source(),
                    path,
                    error = %err,
                    "Pattern evaluation failed, treating as no match"
                );
                return None;
            }
        };

        let mut params = Params::new();
        for slot in &self.slots {
            // groups on an alternation branch that did not match
            let Some(raw) = caps.name(&slot.group).map(|m| m.as_str()) else {
                continue;
            };
            let value = if slot.wildcard {
                ParamValue::Segments(split_segments(raw))
            } else {
                ParamValue::Segment(unquote(raw).into_owned())
            };
            params.insert(slot.key.clone(), value);
        }
        Some(params)
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.captures(path).is_some()
    }

    /// Build the path for `params`.
    ///
    /// Extra keys are ignored. A missing wildcard value generates zero
    /// segments. A trailing `/` is only stripped back to the end of the
    /// last `:name` value, so an empty final segment survives.
    pub fn generate(&self, params: &Params) -> Result<String, GenerateError> {
        let mut path = String::new();
        // length the stripping below may not cut into
        let mut keep = 1;
        for piece in &self.pieces {
            match piece {
                Piece::Text(text) => path.push_str(text),
                Piece::Segment(name) => match params.get(name) {
                    Some(ParamValue::Segment(value)) => {
                        path.push_str(&self.cache.quote(value, SafeSet::Segment));
                        keep = path.len();
                    }
                    Some(ParamValue::Segments(_)) => {
                        return Err(GenerateError::ExpectedSegment(name.clone()));
                    }
                    None => return Err(GenerateError::MissingParam(name.clone())),
                },
                Piece::Wildcard(key) => match params.get(key) {
                    Some(ParamValue::Segment(value)) => {
                        path.push_str(&self.cache.quote(value, SafeSet::Path));
                    }
                    Some(ParamValue::Segments(values)) => {
                        let joined = values
                            .iter()
                            .map(|s| self.cache.quote(s, SafeSet::Segment))
                            .collect::<Vec<_>>()
                            .join("/");
                        path.push_str(&joined);
                    }
                    None => {}
                },
            }
        }

        if self.parsed.has_trailing_slash() {
            if !path.ends_with('/') {
                path.push('/');
            }
        } else {
            while path.len() > keep && path.ends_with('/') {
                path.pop();
            }
        }
        Ok(path)
    }
}

/// Split a wildcard capture into decoded segments, dropping empty ones.
fn split_segments(raw: &str) -> Vec<String> {
    raw.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| unquote(s).into_owned())
        .collect()
}

/// True when a literal opens a capturing group or holds a backreference.
fn has_group_references(raw: &str) -> bool {
    let mut chars = raw.chars().peekable();
    let mut in_class = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('1'..='9') => return true,
                Some('k') | Some('g') if !in_class => return true,
                _ => {}
            },
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '(' if !in_class => {
                if chars.peek() != Some(&'?') {
                    return true;
                }
                chars.next();
                match chars.next() {
                    // `(?P<name>...)` and `(?P=name)`
                    Some('P') => return true,
                    Some('<') if !matches!(chars.peek(), Some('=') | Some('!')) => return true,
                    _ => {}
                }
            }
            _ => {}
        }
    }
    false
}

/// Text a literal contributes to a generated path: escapes resolved,
/// group syntax removed, look-around assertions dropped.
fn literal_text(raw: &str) -> String {
    let mut out = String::new();
    let mut chars = raw.chars().peekable();
    // depth inside a zero-width assertion, whose contents are not emitted
    let mut skip = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    if skip == 0 {
                        out.push(escaped);
                    }
                }
            }
            '(' if skip > 0 => skip += 1,
            '(' => {
                if chars.peek() != Some(&'?') {
                    continue;
                }
                chars.next();
                match chars.peek().copied() {
                    Some('=') | Some('!') => {
                        chars.next();
                        skip = 1;
                    }
                    Some('<') => {
                        chars.next();
                        if matches!(chars.peek(), Some('=') | Some('!')) {
                            chars.next();
                            skip = 1;
                        } else {
                            chars.by_ref().find(|&n| n == '>');
                        }
                    }
                    Some('P') => {
                        chars.by_ref().find(|&n| n == '>');
                    }
                    _ => {
                        // inline flags, optionally opening a group with `:`
                        while let Some(&f) = chars.peek() {
                            if f == ')' {
                                break;
                            }
                            chars.next();
                            if f == ':' {
                                break;
                            }
                        }
                    }
                }
            }
            ')' => skip = skip.saturating_sub(1),
            _ if skip > 0 => {}
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(pattern: &str) -> CompiledPattern {
        PatternCompiler::default().compile(pattern).unwrap()
    }

    fn segments(values: &[&str]) -> ParamValue {
        ParamValue::Segments(values.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_root() {
        let p = compile("/");
        assert_eq!(p.captures("/"), Some(Params::new()));
        assert_eq!(p.captures(""), None);
        assert_eq!(p.generate(&Params::new()).unwrap(), "/");
    }

    #[test]
    fn test_wildcard_segments() {
        let p = compile("/*");
        let params = p.captures("/a/b").unwrap();
        assert_eq!(params.get(""), Some(&segments(&["a", "b"])));
        assert_eq!(p.captures("/").unwrap().get(""), Some(&segments(&[])));
        assert_eq!(p.generate(&params).unwrap(), "/a/b");
    }

    #[test]
    fn test_wildcard_before_segment() {
        let p = compile("/docs/*/:name");
        let params = p.captures("/docs/math/pi").unwrap();
        assert_eq!(params.get(""), Some(&segments(&["math"])));
        assert_eq!(params.get_str("name"), Some("pi"));
        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["", "name"]);
    }

    #[test]
    fn test_wildcard_is_lazy() {
        let p = compile("/*/manage");
        let params = p.captures("/a/b/manage").unwrap();
        assert_eq!(params.get(""), Some(&segments(&["a", "b"])));
        assert!(p.captures("/a/b/manage/x").is_none());
    }

    #[test]
    fn test_named_wildcard() {
        let p = compile("*path");
        let params = p.captures("/some/path").unwrap();
        assert_eq!(params.get("path"), Some(&segments(&["some", "path"])));
    }

    #[test]
    fn test_segment_decoding() {
        let p = compile("/s/:term");
        let params = p.captures("/s/caf%C3%A9%20au%2Flait").unwrap();
        assert_eq!(params.get_str("term"), Some("café au/lait"));
        assert_eq!(p.generate(&params).unwrap(), "/s/caf%C3%A9%20au%2Flait");
    }

    #[test]
    fn test_wildcard_segment_decoding() {
        let p = compile("/files/*path");
        let params = p.captures("/files/a%2Fb/c%20d").unwrap();
        assert_eq!(params.get("path"), Some(&segments(&["a/b", "c d"])));
        assert_eq!(p.generate(&params).unwrap(), "/files/a%2Fb/c%20d");
    }

    #[test]
    fn test_empty_segment_policy() {
        let lax = compile("/s/:term/x");
        assert_eq!(lax.captures("/s//x").unwrap().get_str("term"), Some(""));

        let strict = PatternCompiler::new(CompileOptions { strict_segments: true }, 0)
            .compile("/s/:term/x")
            .unwrap();
        assert!(strict.captures("/s//x").is_none());
        assert!(strict.captures("/s/a/x").is_some());
    }

    #[test]
    fn test_segment_does_not_cross_slash() {
        let p = compile("/rest/:kind/:id");
        assert!(p.captures("/rest/doc/1/2").is_none());
        let params = p.captures("/rest/doc/123").unwrap();
        assert_eq!(params.get_str("kind"), Some("doc"));
        assert_eq!(params.get_str("id"), Some("123"));
    }

    #[test]
    fn test_generate_wildcard_from_string() {
        let p = compile("/docs/*");
        let params = Params::new().with("", "some/path here");
        assert_eq!(p.generate(&params).unwrap(), "/docs/some/path%20here");
    }

    #[test]
    fn test_generate_errors() {
        let p = compile("/docs/*/:name");
        assert_eq!(
            p.generate(&Params::new()),
            Err(GenerateError::MissingParam("name".into()))
        );
        assert_eq!(
            p.generate(&Params::new().with("name", vec!["a"])),
            Err(GenerateError::ExpectedSegment("name".into()))
        );
        let params = Params::new().with("", "some").with("name", "name");
        assert_eq!(p.generate(&params).unwrap(), "/docs/some/name");
    }

    #[test]
    fn test_trailing_slash_is_pattern_controlled() {
        let with_slash = compile("/users/:id/");
        let params = Params::new().with("id", "7");
        assert_eq!(with_slash.generate(&params).unwrap(), "/users/7/");

        let without = compile("/docs/*");
        let params = Params::new().with("", "a/b/");
        assert_eq!(without.generate(&params).unwrap(), "/docs/a/b");
        assert_eq!(without.generate(&Params::new()).unwrap(), "/docs");

        let dir = compile("/tree/*/");
        let params = Params::new().with("", vec!["x", "y"]);
        assert_eq!(dir.generate(&params).unwrap(), "/tree/x/y/");
    }

    #[test]
    fn test_escaped_star() {
        let p = compile(r"/price/\*");
        assert!(p.captures("/price/*").is_some());
        assert!(p.captures("/price/abc").is_none());
        assert!(p.wildcard_key().is_none());
        assert_eq!(p.generate(&Params::new()).unwrap(), "/price/*");
    }

    #[test]
    fn test_lookahead_passes_through() {
        let p = compile("/s/(?=[abc]+$):term");
        assert_eq!(p.captures("/s/cab").unwrap().get_str("term"), Some("cab"));
        assert!(p.captures("/s/xyz").is_none());
        let params = Params::new().with("term", "ab");
        assert_eq!(p.generate(&params).unwrap(), "/s/ab");
    }

    #[test]
    fn test_alternation_stays_anchored() {
        let p = compile("/a|/b");
        assert!(p.captures("/a").is_some());
        assert!(p.captures("/b").is_some());
        assert!(p.captures("/ax").is_none());
        assert!(p.captures("x/b").is_none());
    }

    #[test]
    fn test_literal_text() {
        assert_eq!(literal_text(r"/a\.b"), "/a.b");
        assert_eq!(literal_text("/(?:v1)/x"), "/v1/x");
        assert_eq!(literal_text("/(?i)abc"), "/abc");
        assert_eq!(literal_text("/(?<=/)x(?!y)"), "/x");
        assert_eq!(literal_text("/(?P<v>ab)"), "/ab");
    }

    #[test]
    fn test_empty_final_segment_round_trips() {
        let p = compile("/:a/:b");
        let params = Params::new().with("a", "x").with("b", "");
        let path = p.generate(&params).unwrap();
        assert_eq!(path, "/x/");
        assert_eq!(p.captures(&path), Some(params));

        let params = Params::new().with("a", "").with("b", "");
        assert_eq!(p.generate(&params).unwrap(), "//");
        assert_eq!(compile("/:a").generate(&Params::new().with("a", "")).unwrap(), "/");
    }

    #[test]
    fn test_unmatched_branch_is_not_captured() {
        let p = compile("/a|/b/:x");
        assert_eq!(p.captures("/a"), Some(Params::new()));
        assert_eq!(p.captures("/b/").unwrap().get_str("x"), Some(""));
        assert_eq!(p.captures("/b/y").unwrap().get_str("x"), Some("y"));
    }

    #[test]
    fn test_group_references() {
        assert!(compile("/docs/:name").is_combinable());
        assert!(!compile("/(a)\\1").is_combinable());
        assert!(!compile("/(?P<v>x)").is_combinable());
        assert!(!compile("/(?<v>x)").is_combinable());
        assert!(compile("/(?:v1|v2)/:name").is_combinable());
        assert!(compile("/s/(?=[abc]+$):term").is_combinable());
        assert!(compile("/(?<=/)x").is_combinable());
        assert!(compile(r"/[(]\(").is_combinable());
    }

    #[test]
    fn test_invalid_expression_is_syntax_error() {
        let err = PatternCompiler::default().compile("/(abc").unwrap_err();
        assert!(matches!(err, PatternSyntaxError::Regex { .. }));
    }

    #[test]
    fn test_recompile_is_identical() {
        let compiler = PatternCompiler::default();
        let a = compiler.compile("/docs/*/:name").unwrap();
        let b = compiler.compile("/docs/*/:name").unwrap();
        assert_eq!(a.expression(), b.expression());
        assert_eq!(a.captures("/docs/x/y"), b.captures("/docs/x/y"));
    }
}
