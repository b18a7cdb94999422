//! Indented text form of a syntax tree, used by tests and debugging.

use std::fmt::Write;

use super::ast::{Anchor, GroupKind, Node, NodeKind};

pub(super) fn dump(root: &Node, with_info: bool) -> String {
    let mut out = String::new();
    write_node(&mut out, root, 0, with_info);
    out
}

fn write_node(out: &mut String, node: &Node, indent: usize, with_info: bool) {
    let pad = "  ".repeat(indent);
    write!(out, "{pad}").unwrap();
    match &node.kind {
        NodeKind::Empty => out.push_str("Empty"),
        NodeKind::Literal { bytes, ignore_case } => {
            write!(out, "Literal {:?}", String::from_utf8_lossy(bytes)).unwrap();
            if *ignore_case {
                out.push_str(" ic");
            }
        }
        NodeKind::Class { ranges, negated } => {
            out.push_str(if *negated { "Class ^" } else { "Class " });
            let parts: Vec<String> = ranges
                .iter()
                .map(|&(lo, hi)| {
                    if lo == hi {
                        format_code(lo)
                    } else {
                        format!("{}-{}", format_code(lo), format_code(hi))
                    }
                })
                .collect();
            write!(out, "[{}]", parts.join(" ")).unwrap();
        }
        NodeKind::CharType {
            ctype,
            negated,
            ascii,
        } => {
            write!(out, "CharType {}{}", if *negated { "^" } else { "" }, ctype.name()).unwrap();
            if *ascii {
                out.push_str(" ascii");
            }
        }
        NodeKind::AnyChar { multiline } => {
            out.push_str(if *multiline { "AnyChar ml" } else { "AnyChar" });
        }
        NodeKind::BackRef {
            target,
            groups,
            ignore_case,
        } => {
            write!(out, "BackRef {target} -> {groups:?}").unwrap();
            if *ignore_case {
                out.push_str(" ic");
            }
        }
        NodeKind::Quantifier {
            min,
            max,
            greedy,
            possessive,
            ..
        } => {
            let max = max.map_or(String::from("inf"), |m| m.to_string());
            let mode = if *possessive {
                "possessive"
            } else if *greedy {
                "greedy"
            } else {
                "lazy"
            };
            write!(out, "Quantifier {{{min},{max}}} {mode}").unwrap();
        }
        NodeKind::Group { kind, .. } => match kind {
            GroupKind::Capture { group, name } => {
                write!(out, "Capture {group}").unwrap();
                if let Some(name) = name {
                    write!(out, " <{name}>").unwrap();
                }
            }
            GroupKind::NonCapture => out.push_str("Group"),
            GroupKind::Atomic => out.push_str("Atomic"),
            GroupKind::Conditional { target, groups, .. } => {
                write!(out, "Conditional {target} -> {groups:?}").unwrap();
            }
            GroupKind::Absent => out.push_str("Absent"),
        },
        NodeKind::Anchor(anchor) => write_anchor(out, anchor),
        NodeKind::Sequence(_) => out.push_str("Sequence"),
        NodeKind::Alternation(_) => out.push_str("Alternation"),
        NodeKind::Call { target, group } => write!(out, "Call {target} -> {group}").unwrap(),
    }

    if with_info {
        let info = &node.info;
        let max = info.max_chars.map_or(String::from("inf"), |m| m.to_string());
        write!(out, "  [{}..{} bytes>={}", info.min_chars, max, info.min_bytes).unwrap();
        for (name, _) in info.flags.iter_names() {
            write!(out, " {name}").unwrap();
        }
        out.push(']');
    }
    out.push('\n');

    for child in node.children() {
        write_node(out, child, indent + 1, with_info);
    }
}

fn write_anchor(out: &mut String, anchor: &Anchor) {
    let ascii_suffix = |ascii: bool| if ascii { " ascii" } else { "" };
    match anchor {
        Anchor::BeginBuf => out.push_str("Anchor begin-buf"),
        Anchor::EndBuf => out.push_str("Anchor end-buf"),
        Anchor::SemiEndBuf => out.push_str("Anchor semi-end-buf"),
        Anchor::BeginLine => out.push_str("Anchor begin-line"),
        Anchor::EndLine => out.push_str("Anchor end-line"),
        Anchor::BeginPosition => out.push_str("Anchor begin-position"),
        Anchor::WordBoundary { ascii } => write!(out, "Anchor word-bound{}", ascii_suffix(*ascii)).unwrap(),
        Anchor::NotWordBoundary { ascii } => {
            write!(out, "Anchor not-word-bound{}", ascii_suffix(*ascii)).unwrap();
        }
        Anchor::WordBegin { ascii } => write!(out, "Anchor word-begin{}", ascii_suffix(*ascii)).unwrap(),
        Anchor::WordEnd { ascii } => write!(out, "Anchor word-end{}", ascii_suffix(*ascii)).unwrap(),
        Anchor::Keep => out.push_str("Keep"),
        Anchor::Look { behind, negated, .. } => {
            let dir = if *behind { "behind" } else { "ahead" };
            let sign = if *negated { "negative" } else { "positive" };
            write!(out, "Look {sign} {dir}").unwrap();
        }
    }
}

fn format_code(code: u32) -> String {
    match char::from_u32(code) {
        Some(c) if c.is_ascii_graphic() => c.to_string(),
        _ => format!("\\x{{{code:x}}}"),
    }
}
