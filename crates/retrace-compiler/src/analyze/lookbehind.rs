//! Lookbehind validation.
//!
//! Lookbehind bodies are matched forward after stepping back, so the step
//! must be computable: no calls, no absent groups and a bounded maximum
//! length. Dialects
//! without variable-length lookbehind also need a fixed length, or a
//! top-level alternation of fixed-length branches, which is split into one
//! lookbehind per branch.

use retrace_core::{Syntax, SyntaxBehavior};

use crate::diagnostics::{ErrorKind, SyntaxError};
use crate::parser::{Anchor, GroupKind, Node, NodeFlags, NodeKind};

/// Checks every lookbehind; returns whether the tree was rewritten.
pub(super) fn check(node: &mut Node, syntax: &Syntax) -> Result<bool, SyntaxError> {
    let mut changed = false;
    for child in node.children_mut() {
        changed |= check(child, syntax)?;
    }

    let NodeKind::Anchor(Anchor::Look {
        behind: true,
        negated,
        body,
    }) = &mut node.kind
    else {
        return Ok(changed);
    };

    if contains_forbidden(body) || body.info.max_chars.is_none() {
        return Err(SyntaxError::new(ErrorKind::InvalidLookBehind, node.span.clone()));
    }
    if syntax.behaves(SyntaxBehavior::VARIABLE_LEN_LOOK_BEHIND) || body.info.is_fixed() {
        return Ok(changed);
    }

    let splittable = syntax.behaves(SyntaxBehavior::DIFFERENT_LEN_ALT_LOOK_BEHIND)
        && matches!(&body.kind, NodeKind::Alternation(branches) if branches.iter().all(|b| b.info.is_fixed()));
    if !splittable {
        return Err(SyntaxError::new(ErrorKind::InvalidLookBehind, node.span.clone()));
    }

    let negated = *negated;
    let NodeKind::Alternation(branches) = std::mem::replace(&mut body.kind, NodeKind::Empty) else {
        return Ok(changed);
    };
    let span = node.span.clone();
    let looks: Vec<Node> = branches
        .into_iter()
        .map(|branch| {
            Node::new(
                NodeKind::Anchor(Anchor::Look {
                    behind: true,
                    negated,
                    body: Box::new(branch),
                }),
                span.clone(),
            )
        })
        .collect();
    // `(?<!a|bc)` holds when neither holds; `(?<=a|bc)` when either does.
    node.kind = if negated {
        NodeKind::Sequence(looks)
    } else {
        NodeKind::Alternation(looks)
    };
    Ok(true)
}

fn contains_forbidden(node: &Node) -> bool {
    if node.info.flags.contains(NodeFlags::HAS_CALL) {
        return true;
    }
    let mut found = false;
    node.walk(&mut |n| {
        found |= matches!(
            n.kind,
            NodeKind::Group {
                kind: GroupKind::Absent,
                ..
            }
        );
    });
    found
}
