//! Bottom-up length, flag and depth computation.

use retrace_core::encoding::fold_str;
use retrace_core::EncodingRef;

use crate::parser::{Anchor, GroupKind, Node, NodeFlags, NodeInfo, NodeKind};

/// Per-pattern inputs of the length computation.
pub(super) struct LengthCtx {
    pub enc: EncodingRef,
    /// The encoding has folds that change the number of characters.
    pub multi_fold: bool,
    /// Current lower bound on each group's length, used for calls.
    pub group_min: Vec<u32>,
}

impl LengthCtx {
    pub fn new(enc: EncodingRef, num_captures: u16) -> Self {
        let mut multi_fold = false;
        enc.for_each_fold(&mut |_, to| multi_fold |= to.len() > 1);
        Self {
            enc,
            multi_fold,
            group_min: vec![0; usize::from(num_captures) + 1],
        }
    }
}

/// Fills [`NodeInfo`] for the whole tree.
///
/// Calls make lengths depend on each other; group minimums are iterated to a
/// fixpoint, bounded so that groups that never finish cannot loop forever.
pub(super) fn compute(root: &mut Node, ctx: &mut LengthCtx) {
    let rounds = ctx.group_min.len() + 1;
    for _ in 0..rounds {
        fill(root, ctx);
        let mut next = vec![0; ctx.group_min.len()];
        next[0] = root.info.min_chars;
        collect_group_mins(root, &mut next);
        if next == ctx.group_min {
            return;
        }
        ctx.group_min = next;
    }
    fill(root, ctx);
}

fn collect_group_mins(node: &Node, out: &mut [u32]) {
    if let Some(group) = node.capture_group()
        && let Some(slot) = out.get_mut(usize::from(group))
    {
        *slot = node.info.min_chars;
    }
    for child in node.children() {
        collect_group_mins(child, out);
    }
}

fn fill(node: &mut Node, ctx: &LengthCtx) {
    for child in node.children_mut() {
        fill(child, ctx);
    }
    node.info = info_of(node, ctx);
}

fn info_of(node: &Node, ctx: &LengthCtx) -> NodeInfo {
    let enc = ctx.enc;
    let unit = enc.min_char_len() as u32;
    let child_flags = node
        .children()
        .iter()
        .fold(NodeFlags::empty(), |acc, c| acc | inherited(c.info.flags));
    let depth = node.children().iter().map(|c| c.info.depth).max().unwrap_or(0);

    let (min_chars, max_chars, min_bytes, own) = match &node.kind {
        NodeKind::Empty => (0, Some(0), 0, NodeFlags::empty()),
        NodeKind::Literal { bytes, ignore_case } => {
            let chars = count_chars(enc, bytes);
            if *ignore_case && ctx.multi_fold {
                let folded = count_chars(enc, &fold_str(enc, bytes));
                let min = folded.div_ceil(3);
                (min, Some(folded.max(chars)), min * unit, NodeFlags::empty())
            } else if *ignore_case {
                (chars, Some(chars), chars * unit, NodeFlags::empty())
            } else {
                (chars, Some(chars), bytes.len() as u32, NodeFlags::empty())
            }
        }
        NodeKind::Class { .. } | NodeKind::CharType { .. } | NodeKind::AnyChar { .. } => {
            (1, Some(1), unit, NodeFlags::empty())
        }
        NodeKind::BackRef { .. } => (0, None, 0, NodeFlags::HAS_BACKREF),
        NodeKind::Call { group, .. } => {
            let min = ctx.group_min.get(usize::from(*group)).copied().unwrap_or(0);
            (min, None, 0, NodeFlags::HAS_CALL)
        }
        NodeKind::Quantifier { body, min, max, .. } => {
            let b = &body.info;
            let lo = b.min_chars.saturating_mul(*min);
            let hi = match (b.max_chars, *max) {
                (_, Some(0)) | (Some(0), _) => Some(0),
                (Some(bh), Some(qh)) => bh.checked_mul(qh),
                _ => None,
            };
            (lo, hi, b.min_bytes.saturating_mul(*min), NodeFlags::empty())
        }
        NodeKind::Group { kind, body } => {
            let b = &body.info;
            match kind {
                GroupKind::Capture { name, .. } => {
                    let mut own = NodeFlags::HAS_CAPTURE;
                    own.set(NodeFlags::NAMED, name.is_some());
                    (b.min_chars, b.max_chars, b.min_bytes, own)
                }
                GroupKind::NonCapture => (b.min_chars, b.max_chars, b.min_bytes, NodeFlags::empty()),
                GroupKind::Atomic => (b.min_chars, b.max_chars, b.min_bytes, NodeFlags::HAS_CONTROL),
                GroupKind::Conditional { otherwise, .. } => {
                    let (no_min, no_max, no_bytes) = otherwise
                        .as_ref()
                        .map_or((0, Some(0), 0), |n| (n.info.min_chars, n.info.max_chars, n.info.min_bytes));
                    let hi = b.max_chars.zip(no_max).map(|(a, c)| a.max(c));
                    (
                        b.min_chars.min(no_min),
                        hi,
                        b.min_bytes.min(no_bytes),
                        NodeFlags::HAS_CONTROL,
                    )
                }
                GroupKind::Absent => (0, None, 0, NodeFlags::HAS_CONTROL),
            }
        }
        NodeKind::Anchor(Anchor::Look { .. }) => (0, Some(0), 0, NodeFlags::HAS_CONTROL),
        NodeKind::Anchor(_) => (0, Some(0), 0, NodeFlags::empty()),
        NodeKind::Sequence(items) => {
            let min = items.iter().fold(0u32, |acc, n| acc.saturating_add(n.info.min_chars));
            let max = items
                .iter()
                .try_fold(0u32, |acc, n| n.info.max_chars.and_then(|m| acc.checked_add(m)));
            let bytes = items.iter().fold(0u32, |acc, n| acc.saturating_add(n.info.min_bytes));
            (min, max, bytes, NodeFlags::empty())
        }
        NodeKind::Alternation(branches) => {
            let min = branches.iter().map(|n| n.info.min_chars).min().unwrap_or(0);
            let max = branches
                .iter()
                .try_fold(0u32, |acc, n| n.info.max_chars.map(|m| acc.max(m)));
            let bytes = branches.iter().map(|n| n.info.min_bytes).min().unwrap_or(0);
            (min, max, bytes, NodeFlags::empty())
        }
    };

    let mut flags = child_flags | own;
    flags.set(NodeFlags::FIXED_LEN, max_chars == Some(min_chars));
    // Flags placed by the recursion pass survive recomputation.
    flags |= node.info.flags & (NodeFlags::CALLED | NodeFlags::RECURSIVE);

    let unbounded = matches!(node.kind, NodeKind::Quantifier { max: None, .. });
    NodeInfo {
        min_chars,
        max_chars,
        min_bytes,
        flags,
        depth: depth + u16::from(unbounded),
    }
}

/// Flags that describe a subtree rather than the node itself.
fn inherited(flags: NodeFlags) -> NodeFlags {
    flags & (NodeFlags::HAS_BACKREF | NodeFlags::HAS_CAPTURE | NodeFlags::HAS_CALL | NodeFlags::HAS_CONTROL)
}

fn count_chars(enc: EncodingRef, bytes: &[u8]) -> u32 {
    let mut at = 0;
    let mut n = 0u32;
    while at < bytes.len() {
        at += enc.char_len(bytes[at]).max(1);
        n += 1;
    }
    n
}

