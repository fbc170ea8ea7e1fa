//! Path pattern subsystem.
//!
//! # Data Flow
//! ```text
//! "/docs/*/:name"
//!     → grammar.rs (tokens: literal, segment, wildcard)
//!     → compiler.rs (anchored expression + generation pieces)
//!     → CompiledPattern
//!
//! Matching:   "/docs/math/pi" → captures() → {"": ["math"], "name": "pi"}
//! Generation: {"": ["math"], "name": "pi"} → generate() → "/docs/math/pi"
//! ```
//!
//! # Design Decisions
//! - Compiled once per route; matching and generation are pure
//! - Caller regex fragments are never reinterpreted
//! - Captured values are percent-decoded; generated values re-encoded
//! - Encoding cache is bounded and owned by the compiler

pub mod compiler;
pub mod encoding;
pub mod grammar;
pub mod params;

pub use compiler::{CompileOptions, CompiledPattern, GenerateError, PatternCompiler};
pub use grammar::{PatternResult, PatternSyntaxError, WILDCARD_KEY};
pub use params::{ParamValue, Params};
