//! Runtime VM for executing compiled retrace programs.
//!
//! This crate provides the backtracking virtual machine that runs bytecode
//! against a byte subject, producing a [`Region`] of capture offsets.
//!
//! ```
//! use retrace_compiler::{compile, CompileLimits};
//! use retrace_core::{Options, Syntax, UTF8};
//! use retrace_vm::{SearchOutcome, VM};
//!
//! let program = compile(b"b(a+)", &Syntax::ONIGURUMA, Options::empty(), &UTF8, &CompileLimits::default())
//!     .expect("valid pattern");
//! let mut vm = VM::builder(&program, b"xbaa").build();
//! let SearchOutcome::Match(region) = vm.search().expect("within limits") else {
//!     panic!("expected a match");
//! };
//! assert_eq!(region.start(0), Some(1));
//! assert_eq!(region.end(1), Some(4));
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod engine;

// Re-export commonly used items at crate root
pub use engine::{
    Interrupt, MatchLimits, NoopTracer, PrintTracer, Region, RuntimeError, SearchOutcome, Span,
    Tracer, VM, VMBuilder, Verbosity,
};
