//! Call graph analysis.
//!
//! Marks which groups are called and which can re-enter themselves, and
//! rejects recursion that can never end:
//! - Escapable: every recursive group has a way to finish
//! - Guarded: no cycle of calls is reachable without consuming input

use std::ops::Range;

use indexmap::{IndexMap, IndexSet};
use retrace_bytecode::GroupId;

use crate::diagnostics::{ErrorKind, SyntaxError};
use crate::parser::{Anchor, GroupKind, Node, NodeKind};

/// Result of the call graph analysis, indexed by group number.
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    /// Groups targeted by at least one call; index 0 is the whole pattern.
    pub called: Vec<bool>,
    /// Groups that can be re-entered while already running.
    pub recursive: Vec<bool>,
}

impl CallGraph {
    pub fn is_called(&self, group: GroupId) -> bool {
        self.called.get(usize::from(group)).copied().unwrap_or(false)
    }

    pub fn is_recursive(&self, group: GroupId) -> bool {
        self.recursive.get(usize::from(group)).copied().unwrap_or(false)
    }

    pub fn has_calls(&self) -> bool {
        self.called.iter().any(|&c| c)
    }
}

struct GroupBody<'a> {
    node: &'a Node,
    span: Range<usize>,
}

pub(super) fn analyze(root: &Node, num_captures: u16) -> Result<CallGraph, SyntaxError> {
    let size = usize::from(num_captures) + 1;
    let mut graph = CallGraph {
        called: vec![false; size],
        recursive: vec![false; size],
    };

    let mut bodies: IndexMap<GroupId, GroupBody<'_>> = IndexMap::new();
    bodies.insert(
        0,
        GroupBody {
            node: root,
            span: root.span.clone(),
        },
    );
    root.walk(&mut |n| {
        if let (Some(group), NodeKind::Group { body, .. }) = (n.capture_group(), &n.kind) {
            bodies.entry(group).or_insert(GroupBody {
                node: body,
                span: n.span.clone(),
            });
        }
    });

    let mut any_call = false;
    root.walk(&mut |n| {
        if let NodeKind::Call { group, .. } = n.kind {
            any_call = true;
            graph.called[usize::from(group)] = true;
        }
    });
    if !any_call {
        return Ok(graph);
    }

    let edges: IndexMap<GroupId, IndexSet<GroupId>> = bodies
        .iter()
        .map(|(&g, body)| (g, calls_in(body.node)))
        .collect();

    for &g in bodies.keys() {
        graph.recursive[usize::from(g)] = reaches(&edges, g, g);
    }

    check_escapable(&bodies, &edges, &graph)?;
    check_guarded(&bodies)?;
    Ok(graph)
}

/// Every call target anywhere inside `node`.
fn calls_in(node: &Node) -> IndexSet<GroupId> {
    let mut out = IndexSet::new();
    node.walk(&mut |n| {
        if let NodeKind::Call { group, .. } = n.kind {
            out.insert(group);
        }
    });
    out
}

/// Whether `to` is reachable from `from` through at least one call.
fn reaches(edges: &IndexMap<GroupId, IndexSet<GroupId>>, from: GroupId, to: GroupId) -> bool {
    let mut seen = IndexSet::new();
    let mut stack: Vec<GroupId> = edges.get(&from).map(|e| e.iter().copied().collect()).unwrap_or_default();
    while let Some(g) = stack.pop() {
        if g == to {
            return true;
        }
        if seen.insert(g)
            && let Some(next) = edges.get(&g)
        {
            stack.extend(next.iter().copied());
        }
    }
    false
}

/// A recursive group must be able to finish: some path through its body
/// only calls groups already known to finish.
fn check_escapable(
    bodies: &IndexMap<GroupId, GroupBody<'_>>,
    edges: &IndexMap<GroupId, IndexSet<GroupId>>,
    graph: &CallGraph,
) -> Result<(), SyntaxError> {
    let mut finishes: IndexSet<GroupId> = bodies
        .keys()
        .copied()
        .filter(|g| edges.get(g).is_none_or(IndexSet::is_empty))
        .collect();
    loop {
        let before = finishes.len();
        for (&g, body) in bodies {
            if !finishes.contains(&g) && can_finish(body.node, &finishes) {
                finishes.insert(g);
            }
        }
        if finishes.len() == before {
            break;
        }
    }

    for (&g, body) in bodies {
        if graph.is_recursive(g) && !finishes.contains(&g) {
            return Err(SyntaxError::new(ErrorKind::NeverEndingRecursion, body.span.clone()));
        }
    }
    Ok(())
}

fn can_finish(node: &Node, finishes: &IndexSet<GroupId>) -> bool {
    match &node.kind {
        NodeKind::Call { group, .. } => finishes.contains(group),
        NodeKind::Sequence(items) => items.iter().all(|n| can_finish(n, finishes)),
        NodeKind::Alternation(branches) => branches.iter().any(|n| can_finish(n, finishes)),
        NodeKind::Quantifier { body, min, .. } => *min == 0 || can_finish(body, finishes),
        NodeKind::Group {
            kind: GroupKind::Conditional { otherwise, .. },
            body,
        } => can_finish(body, finishes) || otherwise.as_ref().is_none_or(|n| can_finish(n, finishes)),
        NodeKind::Group { body, .. } => can_finish(body, finishes),
        NodeKind::Anchor(Anchor::Look { negated, body, .. }) => *negated || can_finish(body, finishes),
        _ => true,
    }
}

/// Rejects call cycles reachable before any input is consumed.
fn check_guarded(bodies: &IndexMap<GroupId, GroupBody<'_>>) -> Result<(), SyntaxError> {
    let edges: IndexMap<GroupId, IndexSet<GroupId>> = bodies
        .iter()
        .map(|(&g, body)| {
            let mut out = IndexSet::new();
            zero_offset_calls(body.node, &mut out);
            (g, out)
        })
        .collect();
    for (&g, body) in bodies {
        if reaches(&edges, g, g) {
            return Err(SyntaxError::new(ErrorKind::NeverEndingRecursion, body.span.clone()));
        }
    }
    Ok(())
}

fn zero_offset_calls(node: &Node, out: &mut IndexSet<GroupId>) {
    match &node.kind {
        NodeKind::Call { group, .. } => {
            out.insert(*group);
        }
        NodeKind::Sequence(items) => {
            for item in items {
                zero_offset_calls(item, out);
                if item.info.min_chars > 0 {
                    break;
                }
            }
        }
        NodeKind::Quantifier { max: Some(0), .. } => {}
        _ => {
            for child in node.children() {
                zero_offset_calls(child, out);
            }
        }
    }
}
