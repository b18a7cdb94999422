//! Pattern parser.
//!
//! # Architecture
//!
//! A hand-written recursive-descent parser over raw pattern bytes. The
//! dialect ([`Syntax`]) decides which constructs exist and how they are
//! spelled; the encoding decides how bytes group into characters.
//!
//! - Parsing stops at the first error; there is no recovery.
//! - Inline options (`(?i)`, `(?x:...)`) are resolved while parsing and baked
//!   into the nodes they affect.
//! - Groups get raw numbers in order of their opening parenthesis. A resolve
//!   pass then applies the capture-only-named rule, builds the name table
//!   and binds every backreference, call and condition to group numbers.

pub mod ast;

mod class_set;
mod core;
mod grammar;
mod invariants;
mod printer;
mod resolve;

#[cfg(test)]
mod parser_tests;

pub use ast::{Anchor, GroupKind, Node, NodeFlags, NodeInfo, NodeKind, Target};
pub use core::Parser;

use retrace_bytecode::NameTable;
use retrace_core::{EncodingRef, Options, Syntax};

use crate::diagnostics::SyntaxError;
use crate::limits::CompileLimits;

/// A parsed and resolved pattern.
#[derive(Debug, Clone)]
pub struct Ast {
    pub root: Node,
    /// Capture groups after renumbering, not counting group 0.
    pub num_captures: u16,
    pub names: NameTable,
    /// The pattern calls itself through `\g<0>` or `(?R)`.
    pub calls_whole_pattern: bool,
}

impl Ast {
    /// Indented tree dump, one node per line.
    pub fn dump(&self) -> String {
        printer::dump(&self.root, false)
    }

    /// Like [`Ast::dump`], with the analyzer's length and flag annotations.
    pub fn dump_with_info(&self) -> String {
        printer::dump(&self.root, true)
    }
}

/// Parses `pattern` and resolves its group references.
///
/// `options` must already include the dialect's defaults.
pub fn parse(
    pattern: &[u8],
    syntax: &Syntax,
    options: Options,
    enc: EncodingRef,
    limits: &CompileLimits,
) -> Result<Ast, SyntaxError> {
    let mut parser = Parser::new(pattern, syntax, options, enc, limits);
    let root = parser.parse_root()?;
    resolve::resolve(parser, root)
}
