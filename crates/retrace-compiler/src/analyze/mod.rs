//! Semantic analysis passes over a resolved syntax tree.
//!
//! - Lengths, subtree flags and quantifier depth (lengths)
//! - Lookbehind validation and splitting (lookbehind)
//! - Call graph, recursion marking and never-ending recursion (recursion)

mod lengths;
mod lookbehind;
mod recursion;

#[cfg(test)]
mod analyze_tests;

pub use recursion::CallGraph;

use retrace_core::{EncodingRef, Syntax};

use crate::diagnostics::SyntaxError;
use crate::parser::{Ast, Node, NodeFlags};

/// Facts gathered by the analyzer that are not stored on nodes.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub calls: CallGraph,
}

/// Runs all passes, annotating `ast` in place.
pub fn analyze(ast: &mut Ast, syntax: &Syntax, enc: EncodingRef) -> Result<Analysis, SyntaxError> {
    let mut ctx = lengths::LengthCtx::new(enc, ast.num_captures);
    lengths::compute(&mut ast.root, &mut ctx);
    if lookbehind::check(&mut ast.root, syntax)? {
        lengths::compute(&mut ast.root, &mut ctx);
    }

    let calls = recursion::analyze(&ast.root, ast.num_captures)?;
    mark_groups(&mut ast.root, &calls);
    log::debug!(
        "analyzed pattern: min {} chars, depth {}, calls {}",
        ast.root.info.min_chars,
        ast.root.info.depth,
        calls.has_calls(),
    );
    Ok(Analysis { calls })
}

fn mark_groups(node: &mut Node, calls: &CallGraph) {
    if let Some(group) = node.capture_group() {
        node.info.flags.set(NodeFlags::CALLED, calls.is_called(group));
        node.info.flags.set(NodeFlags::RECURSIVE, calls.is_recursive(group));
    }
    for child in node.children_mut() {
        mark_groups(child, calls);
    }
}
