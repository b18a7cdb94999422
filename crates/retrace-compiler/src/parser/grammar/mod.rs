//! Grammar productions for patterns.
//!
//! All `parse_*` methods extend [`Parser`](super::core::Parser). Every
//! production consumes what it recognizes and leaves the cursor on the
//! first byte it does not own.

mod atoms;
mod classes;
mod escapes;
mod expressions;
mod groups;
mod refs;

pub(super) use atoms::Atom;
