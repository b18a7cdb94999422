//! Search hints.
//!
//! Facts about where a match can start, derived from the front of the tree.
//! Every hint is conservative: a start offset it rejects can never match.

use retrace_bytecode::{AnchorHint, ByteMap, CharClass, SearchHints};
use retrace_core::encoding::fold_str;
use retrace_core::{CodePoint, EncodingRef};

use crate::parser::{Anchor, GroupKind, Node, NodeKind};

pub(super) fn compute(root: &Node, enc: EncodingRef) -> SearchHints {
    SearchHints {
        anchor: anchor_of(root),
        prefix: prefix_of(root).map(Into::into),
        first_bytes: first_bytes(root, enc),
        min_len: root.info.min_bytes as usize,
    }
}

fn is_zero_width(node: &Node) -> bool {
    matches!(node.kind, NodeKind::Anchor(_) | NodeKind::Empty)
}

/// Anchors every match must begin with.
fn anchor_of(node: &Node) -> AnchorHint {
    match &node.kind {
        NodeKind::Anchor(Anchor::BeginBuf) => AnchorHint::BEGIN_BUF,
        NodeKind::Anchor(Anchor::BeginPosition) => AnchorHint::BEGIN_POSITION,
        NodeKind::Anchor(Anchor::BeginLine) => AnchorHint::BEGIN_LINE,
        NodeKind::Sequence(items) => items.first().map_or(AnchorHint::empty(), anchor_of),
        NodeKind::Alternation(branches) => branches
            .iter()
            .map(anchor_of)
            .reduce(|a, b| a & b)
            .unwrap_or_default(),
        NodeKind::Group {
            kind: GroupKind::Capture { .. } | GroupKind::NonCapture | GroupKind::Atomic,
            body,
        } => anchor_of(body),
        NodeKind::Quantifier { body, min, .. } if *min > 0 => anchor_of(body),
        _ => AnchorHint::empty(),
    }
}

/// Case-sensitive literal bytes every match starts with.
fn prefix_of(node: &Node) -> Option<Vec<u8>> {
    match &node.kind {
        NodeKind::Literal {
            bytes,
            ignore_case: false,
        } if !bytes.is_empty() => Some(bytes.clone()),
        NodeKind::Sequence(items) => items.iter().find(|n| !is_zero_width(n)).and_then(prefix_of),
        NodeKind::Group {
            kind: GroupKind::Capture { .. } | GroupKind::NonCapture | GroupKind::Atomic,
            body,
        } => prefix_of(body),
        _ => None,
    }
}

/// Bytes a match may start with; `None` when it cannot be narrowed down.
fn first_bytes(node: &Node, enc: EncodingRef) -> Option<ByteMap> {
    match &node.kind {
        NodeKind::Literal { bytes, ignore_case } => {
            let &head = bytes.first()?;
            if *ignore_case {
                folded_first_bytes(bytes, enc)
            } else {
                Some(single(head))
            }
        }
        NodeKind::Class { ranges, negated } => {
            let class = CharClass::from_ranges(ranges, *negated);
            if class.has_high() || (!enc.is_single_byte() && class.low_map().iter_ones().any(|b| b >= 0x80)) {
                return None;
            }
            Some(class.low_map())
        }
        NodeKind::Sequence(items) => {
            let first = items.iter().find(|n| !is_zero_width(n))?;
            if first.info.min_chars == 0 {
                return None;
            }
            first_bytes(first, enc)
        }
        NodeKind::Alternation(branches) => {
            let mut out = ByteMap::ZERO;
            for branch in branches {
                if branch.info.min_chars == 0 {
                    return None;
                }
                let map = first_bytes(branch, enc)?;
                out |= map.as_bitslice();
            }
            Some(out)
        }
        NodeKind::Group {
            kind: GroupKind::Capture { .. } | GroupKind::NonCapture | GroupKind::Atomic,
            body,
        } => first_bytes(body, enc),
        NodeKind::Quantifier { body, min, .. } if *min > 0 => first_bytes(body, enc),
        _ => None,
    }
}

fn single(byte: u8) -> ByteMap {
    let mut map = ByteMap::ZERO;
    map.set(usize::from(byte), true);
    map
}

/// Lead bytes of every character that folds together with the literal's
/// first character.
fn folded_first_bytes(bytes: &[u8], enc: EncodingRef) -> Option<ByteMap> {
    let len = enc.char_len(bytes[0]).clamp(1, bytes.len());
    let code = enc.decode(&bytes[..len]);
    let folded = fold_str(enc, &bytes[..len]);
    let &folded_head = folded.first()?;
    let folded_code = enc.decode(&folded);
    if enc.char_len(folded_head) < folded.len() {
        // Folds to several characters: anything sharing the expansion may
        // start the match.
        return None;
    }

    let mut codes: Vec<CodePoint> = vec![code, folded_code];
    let mut expands = false;
    enc.for_each_fold(&mut |from, to| {
        if to.len() == 1 {
            if from == code || from == folded_code {
                codes.push(to[0]);
            }
        } else if to[0] == folded_code {
            codes.push(from);
        } else if from == code {
            expands = true;
        }
    });
    if expands {
        return None;
    }

    let mut map = ByteMap::ZERO;
    let mut buf = Vec::new();
    for code in codes {
        buf.clear();
        enc.encode(code, &mut buf).ok()?;
        map.set(usize::from(*buf.first()?), true);
    }
    Some(map)
}
