//! Backtracking engine for compiled retrace programs.
//!
//! The VM interprets a [`retrace_bytecode::Program`] against a subject,
//! using one explicit frame stack for alternatives and undo records, so
//! deep backtracking never depends on the host call stack.

mod captures;
mod error;
mod frame;
mod input;
mod interrupt;
mod invariants;
mod memo;
mod region;
mod search;
mod trace;
mod vm;

#[cfg(test)]
mod frame_tests;
#[cfg(test)]
mod region_tests;
#[cfg(test)]
mod search_tests;
#[cfg(test)]
mod trace_tests;
#[cfg(test)]
mod vm_tests;

pub use error::RuntimeError;
pub use interrupt::Interrupt;
pub use region::{Region, Span};
pub use search::SearchOutcome;
pub use trace::{NoopTracer, PrintTracer, Tracer, Verbosity};
pub use vm::{MatchLimits, VM, VMBuilder};
