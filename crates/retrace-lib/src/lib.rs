//! retrace: backtracking regular expressions with Oniguruma-compatible syntax.
//!
//! # Example
//!
//! ```
//! use retrace::Regex;
//!
//! let re = Regex::new(r"(?<year>\d{4})-(?<month>\d{2})").expect("valid pattern");
//! let caps = re.captures("due 2024-07").expect("within limits").expect("matches");
//! assert_eq!(caps.name("year").map(|m| m.range()), Some(4..8));
//! assert_eq!(caps.name("month").and_then(|m| m.as_str()), Some("07"));
//! ```
//!
//! Patterns compile once into an immutable program that can be shared
//! across threads; every search owns its own matching state.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod captures;
mod regex;

#[cfg(test)]
mod behavior_tests;

pub use captures::{Captures, Match};
pub use regex::{Regex, RegexBuilder};

pub use retrace_bytecode::{GroupId, Program};
pub use retrace_compiler::{CompileLimits, ErrorKind, SyntaxError};
pub use retrace_core::{
    ASCII, Colors, Encoding, EncodingRef, LATIN1, Options, SearchOptions, Syntax, UTF8,
};
pub use retrace_vm::{
    Interrupt, MatchLimits, PrintTracer, Region, RuntimeError, SearchOutcome, Span, Tracer,
    Verbosity,
};

/// Errors returned by [`Regex`] construction and searches.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The pattern was rejected.
    #[error(transparent)]
    Compile(#[from] retrace_compiler::Error),

    /// A search hit one of its [`MatchLimits`].
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// A convenience search was cancelled through its [`Interrupt`].
    #[error("search interrupted")]
    Interrupted,
}

impl Error {
    /// Numeric code of the error; `None` for an interrupted search.
    pub fn code(&self) -> Option<i32> {
        match self {
            Error::Compile(e) => Some(e.code()),
            Error::Runtime(e) => Some(e.code()),
            Error::Interrupted => None,
        }
    }

    /// The syntax error behind a rejected pattern.
    pub fn syntax(&self) -> Option<&SyntaxError> {
        match self {
            Error::Compile(retrace_compiler::Error::Syntax(e)) => Some(e),
            _ => None,
        }
    }

    /// Report for `pattern`, annotated with the offending span when the
    /// pattern was rejected.
    pub fn render(&self, pattern: &str, colored: bool) -> String {
        match self.syntax() {
            Some(e) => e.render(pattern, colored),
            None => self.to_string(),
        }
    }
}

/// Result type for regex operations.
pub type Result<T> = std::result::Result<T, Error>;
