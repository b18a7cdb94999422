#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Pattern compiler for the retrace regex engine.
//!
//! Turns pattern bytes into an immutable [`Program`] in three stages:
//! - [`parser`]: dialect-aware parsing and group resolution
//! - [`analyze`]: lengths, lookbehind checks and the call graph
//! - code generation with symbolic labels, then layout and search hints
//!
//! ```
//! use retrace_compiler::{compile, CompileLimits};
//! use retrace_core::{Options, Syntax, UTF8};
//!
//! let program = compile(b"a(b|c)*", &Syntax::ONIGURUMA, Options::empty(), &UTF8, &CompileLimits::default())
//!     .expect("valid pattern");
//! assert_eq!(program.num_captures(), 1);
//! ```

pub mod analyze;
pub mod diagnostics;
pub mod limits;
pub mod parser;

mod compile;

#[cfg(test)]
mod lib_tests;

pub use compile::{CompileError, generate};
pub use diagnostics::{ErrorKind, SyntaxError};
pub use limits::CompileLimits;
pub use parser::{Ast, parse};

use retrace_bytecode::Program;
use retrace_core::{EncodingRef, Options, Syntax};

/// Errors returned by [`compile`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl Error {
    /// Numeric code of a syntax error; generator failures share `-1`.
    pub fn code(&self) -> i32 {
        match self {
            Error::Syntax(e) => e.code(),
            Error::Compile(_) => -1,
        }
    }
}

/// Options a pattern is compiled with: the dialect's defaults plus the
/// caller's, with `NEGATE_SINGLE_LINE` cancelling a default `SINGLELINE`.
pub fn effective_options(syntax: &Syntax, options: Options) -> Result<Options, SyntaxError> {
    if options.contains(Options::DONT_CAPTURE_GROUP | Options::CAPTURE_GROUP) {
        return Err(SyntaxError::new(ErrorKind::InvalidCombinationOfOptions, 0..0));
    }
    let mut effective = syntax.options | options;
    if options.contains(Options::NEGATE_SINGLE_LINE) {
        effective.remove(Options::SINGLELINE | Options::NEGATE_SINGLE_LINE);
    }
    Ok(effective)
}

/// Compiles `pattern` into a program for `enc`.
pub fn compile(
    pattern: &[u8],
    syntax: &Syntax,
    options: Options,
    enc: EncodingRef,
    limits: &CompileLimits,
) -> Result<Program, Error> {
    let options = effective_options(syntax, options)?;
    let mut ast = parse(pattern, syntax, options, enc, limits)?;
    let analysis = analyze::analyze(&mut ast, syntax, enc)?;
    let program = generate(&ast, &analysis, syntax, options, enc, limits)?;
    log::debug!(
        "compiled {} pattern bytes into {} instructions",
        pattern.len(),
        program.len()
    );
    Ok(program)
}
