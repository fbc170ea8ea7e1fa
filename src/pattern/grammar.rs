//! Path pattern grammar.
//!
//! A pattern is literal text with three kinds of embedded tokens:
//!
//! ```text
//! /docs/:name          named single-segment capture
//! /files/*path         named multi-segment wildcard
//! /*/manage            unnamed wildcard (traversal remainder)
//! /price/\*            escaped star, matched literally
//! /s/(?=[abc]+):term   caller regex fragments are kept verbatim
//! ```
//!
//! Literal text is handed to the regex engine untouched; the scanner only
//! recognises the tokens it owns. A `*` inside a character class, or right
//! after `)` or `]`, is a regex quantifier rather than a wildcard.

use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

/// Key under which the unnamed wildcard is reported.
pub const WILDCARD_KEY: &str = "";

/// Errors raised while parsing or compiling a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternSyntaxError {
    #[error("pattern `{pattern}` declares more than one wildcard")]
    MultipleWildcards { pattern: String },

    #[error("pattern `{pattern}` binds `{name}` more than once")]
    DuplicateName { pattern: String, name: String },

    #[error("pattern `{pattern}` ends with a dangling escape")]
    DanglingEscape { pattern: String },

    #[error("pattern `{pattern}` has an unclosed character class")]
    UnclosedClass { pattern: String },

    #[error("pattern `{pattern}` is not a valid expression: {reason}")]
    Regex { pattern: String, reason: String },
}

/// Result type for pattern operations.
pub type PatternResult<T> = Result<T, PatternSyntaxError>;

/// One lexical unit of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Raw expression text, passed through to the regex engine.
    Literal(String),
    /// `:name`
    Segment(String),
    /// `*` (None) or `*name`.
    Wildcard(Option<String>),
}

impl Token {
    /// Parameter key this token binds, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Token::Literal(_) => None,
            Token::Segment(name) => Some(name),
            Token::Wildcard(name) => Some(name.as_deref().unwrap_or(WILDCARD_KEY)),
        }
    }
}

/// A pattern split into tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPattern {
    source: String,
    tokens: Vec<Token>,
}

impl ParsedPattern {
    /// The pattern as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The wildcard token's key, if the pattern has one.
    pub fn wildcard_key(&self) -> Option<&str> {
        self.tokens.iter().find_map(|t| match t {
            Token::Wildcard(_) => t.key(),
            _ => None,
        })
    }

    /// Names of the single-segment captures, in pattern order.
    pub fn segment_names(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match t {
            Token::Segment(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// True when the pattern is written with a trailing `/`.
    pub fn has_trailing_slash(&self) -> bool {
        self.source.ends_with('/')
    }
}

/// Parse a pattern string into tokens.
pub fn parse(pattern: &str) -> PatternResult<ParsedPattern> {
    Scanner {
        source: pattern,
        chars: pattern.chars().peekable(),
        tokens: Vec::new(),
        literal: String::new(),
        names: Vec::new(),
        in_class: false,
        after_close: false,
    }
    .run()
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

struct Scanner<'a> {
    source: &'a str,
    chars: Peekable<Chars<'a>>,
    tokens: Vec<Token>,
    literal: String,
    names: Vec<String>,
    in_class: bool,
    // previous character closed a group or class, so `*` quantifies it
    after_close: bool,
}

impl Scanner<'_> {
    fn run(mut self) -> PatternResult<ParsedPattern> {
        while let Some(c) = self.chars.next() {
            let closes = match c {
                '\\' => {
                    let escaped = self.chars.next().ok_or_else(|| {
                        PatternSyntaxError::DanglingEscape {
                            pattern: self.source.to_string(),
                        }
                    })?;
                    self.literal.push('\\');
                    self.literal.push(escaped);
                    false
                }
                '[' if !self.in_class => {
                    self.in_class = true;
                    self.literal.push(c);
                    // `[]...]` and `[^]...]` keep the leading `]` literal
                    if self.chars.peek() == Some(&'^') {
                        self.literal.push('^');
                        self.chars.next();
                    }
                    if self.chars.peek() == Some(&']') {
                        self.literal.push(']');
                        self.chars.next();
                    }
                    false
                }
                ']' if self.in_class => {
                    self.in_class = false;
                    self.literal.push(c);
                    true
                }
                _ if self.in_class => {
                    self.literal.push(c);
                    false
                }
                '(' => {
                    self.literal.push(c);
                    if self.chars.peek() == Some(&'?') {
                        self.group_introducer();
                    }
                    false
                }
                ')' => {
                    self.literal.push(c);
                    true
                }
                '*' if self.after_close => {
                    self.literal.push(c);
                    false
                }
                '*' => {
                    let name = self.take_name();
                    self.push_wildcard(name)?;
                    false
                }
                ':' if self.chars.peek().copied().is_some_and(is_name_start) => {
                    let name = self.take_name().unwrap_or_default();
                    self.push_segment(name)?;
                    false
                }
                _ => {
                    self.literal.push(c);
                    false
                }
            };
            self.after_close = closes;
        }

        if self.in_class {
            return Err(PatternSyntaxError::UnclosedClass {
                pattern: self.source.to_string(),
            });
        }
        self.flush_literal();

        Ok(ParsedPattern {
            source: self.source.to_string(),
            tokens: self.tokens,
        })
    }

    /// Copy `?`, inline flags and the `:` of `(?:` / `(?i:` verbatim.
    fn group_introducer(&mut self) {
        if let Some(q) = self.chars.next() {
            self.literal.push(q);
        }
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_alphabetic() && c != 'P' || c == '-' {
                self.literal.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if self.chars.peek() == Some(&':') {
            self.literal.push(':');
            self.chars.next();
        }
    }

    fn take_name(&mut self) -> Option<String> {
        match self.chars.peek() {
            Some(&c) if is_name_start(c) => {}
            _ => return None,
        }
        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            if !is_name_char(c) {
                break;
            }
            name.push(c);
            self.chars.next();
        }
        Some(name)
    }

    fn claim(&mut self, key: &str) -> PatternResult<()> {
        if self.names.iter().any(|n| n == key) {
            return Err(PatternSyntaxError::DuplicateName {
                pattern: self.source.to_string(),
                name: key.to_string(),
            });
        }
        self.names.push(key.to_string());
        Ok(())
    }

    fn push_segment(&mut self, name: String) -> PatternResult<()> {
        self.claim(&name)?;
        self.flush_literal();
        self.tokens.push(Token::Segment(name));
        Ok(())
    }

    fn push_wildcard(&mut self, name: Option<String>) -> PatternResult<()> {
        if self.tokens.iter().any(|t| matches!(t, Token::Wildcard(_))) {
            return Err(PatternSyntaxError::MultipleWildcards {
                pattern: self.source.to_string(),
            });
        }
        self.claim(name.as_deref().unwrap_or(WILDCARD_KEY))?;
        self.flush_literal();
        self.tokens.push(Token::Wildcard(name));
        Ok(())
    }

    fn flush_literal(&mut self) {
        if !self.literal.is_empty() {
            self.tokens.push(Token::Literal(std::mem::take(&mut self.literal)));
        }
    }
}
