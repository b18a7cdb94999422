//! Capture instruction selection.
//!
//! `MemStart`/`MemEnd` overwrite a group's span without leaving anything on
//! the backtrack stack. That is only sound where a failed path can never
//! leave a stale span visible to a later successful one: the group must lie
//! on every path through the pattern, outside loops, alternatives, negative
//! or backward lookaround, conditionals, absent groups and subroutines.
//! Everywhere else the `Push` variants log the previous span for undo.

use std::ops::Range;

use retrace_bytecode::GroupId;

use crate::analyze::CallGraph;
use crate::parser::{Anchor, GroupKind, Node, NodeKind};

/// For every group number, whether all of its definitions can use the plain
/// instructions. Capture history needs every span logged, so it disables
/// them entirely.
pub(super) fn plain_groups(root: &Node, calls: &CallGraph, num_captures: u16, history: bool) -> Vec<bool> {
    let mut plain = vec![!history; usize::from(num_captures) + 1];
    let whole_called = calls.is_called(0);
    visit(root, !whole_called, calls, &mut plain);
    plain
}

fn visit(node: &Node, safe: bool, calls: &CallGraph, plain: &mut [bool]) {
    let mut child_safe = safe;
    if let Some(group) = node.capture_group() {
        let called = calls.is_called(group);
        if !safe || called {
            plain[usize::from(group)] = false;
        }
        child_safe &= !called;
    }
    child_safe &= match &node.kind {
        NodeKind::Sequence(_) => true,
        NodeKind::Group { kind, .. } => {
            matches!(kind, GroupKind::Capture { .. } | GroupKind::NonCapture | GroupKind::Atomic)
        }
        NodeKind::Anchor(Anchor::Look {
            behind: false,
            negated: false,
            ..
        }) => true,
        _ => false,
    };
    for child in node.children() {
        visit(child, child_safe, calls, plain);
    }
}

/// Capture groups a subroutine can touch, including the group itself.
pub(super) fn group_range(node: &Node, group: GroupId) -> Range<GroupId> {
    let mut lo = group;
    let mut hi = group;
    node.walk(&mut |n| {
        if let Some(g) = n.capture_group() {
            lo = lo.min(g);
            hi = hi.max(g);
        }
    });
    lo..hi + 1
}
