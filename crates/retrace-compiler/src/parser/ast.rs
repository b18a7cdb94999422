//! Pattern syntax tree.
//!
//! The tree is built by the parser, completed by name resolution, and then
//! only read: the analyzer fills [`NodeInfo`] and the code generator walks
//! the result. Options in effect at each point of the pattern (case
//! folding, dot-all, ASCII restrictions) are already baked into the nodes.

use std::ops::Range;

use bitflags::bitflags;
use retrace_bytecode::GroupId;
use retrace_core::{CharType, CodeRange};

bitflags! {
    /// Facts derived bottom-up by the analyzer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u16 {
        /// `min_chars == max_chars`.
        const FIXED_LEN   = 1 << 0;
        const HAS_BACKREF = 1 << 1;
        const HAS_CAPTURE = 1 << 2;
        const HAS_CALL    = 1 << 3;
        /// Capture group with a name.
        const NAMED       = 1 << 4;
        /// Capture group that can re-enter itself through calls.
        const RECURSIVE   = 1 << 5;
        /// Capture group targeted by at least one call.
        const CALLED      = 1 << 6;
        /// Contains a lookaround, atomic group, conditional or absent group.
        const HAS_CONTROL = 1 << 7;
    }
}

/// Derived length and shape information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeInfo {
    /// Fewest characters the node can consume.
    pub min_chars: u32,
    /// Most characters the node can consume; `None` is unbounded.
    pub max_chars: Option<u32>,
    /// Fewest bytes the node can consume.
    pub min_bytes: u32,
    pub flags: NodeFlags,
    /// Deepest chain of nested unbounded quantifiers inside the node.
    pub depth: u16,
}

impl NodeInfo {
    pub fn is_fixed(&self) -> bool {
        self.flags.contains(NodeFlags::FIXED_LEN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Range<usize>,
    pub info: NodeInfo,
}

impl Node {
    pub fn new(kind: NodeKind, span: Range<usize>) -> Self {
        Self {
            kind,
            span,
            info: NodeInfo::default(),
        }
    }

    pub fn empty(at: usize) -> Self {
        Self::new(NodeKind::Empty, at..at)
    }
}

/// How a reference names its group before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Name(String),
    /// Absolute group number in definition order.
    Number(u32),
    /// Relative number already made absolute; kept apart for error messages.
    Relative(u32),
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Name(name) => f.write_str(name),
            Target::Number(n) | Target::Relative(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKind {
    Capture {
        group: GroupId,
        name: Option<String>,
    },
    NonCapture,
    Atomic,
    /// `(?(cond)yes|no)`: the group body is the `yes` branch.
    Conditional {
        target: Target,
        groups: Vec<GroupId>,
        otherwise: Option<Box<Node>>,
    },
    /// `(?~...)`: the longest run of text not containing the body.
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    BeginBuf,
    EndBuf,
    SemiEndBuf,
    BeginLine,
    EndLine,
    BeginPosition,
    WordBoundary { ascii: bool },
    NotWordBoundary { ascii: bool },
    WordBegin { ascii: bool },
    WordEnd { ascii: bool },
    /// `\K`
    Keep,
    Look {
        behind: bool,
        negated: bool,
        body: Box<Node>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Empty,
    Literal {
        bytes: Vec<u8>,
        ignore_case: bool,
    },
    /// Sorted, non-overlapping ranges; case folding already applied.
    Class {
        ranges: Vec<CodeRange>,
        negated: bool,
    },
    CharType {
        ctype: CharType,
        negated: bool,
        ascii: bool,
    },
    AnyChar {
        multiline: bool,
    },
    BackRef {
        target: Target,
        groups: Vec<GroupId>,
        ignore_case: bool,
    },
    Quantifier {
        body: Box<Node>,
        min: u32,
        max: Option<u32>,
        greedy: bool,
        possessive: bool,
    },
    Group {
        kind: GroupKind,
        body: Box<Node>,
    },
    Anchor(Anchor),
    Sequence(Vec<Node>),
    Alternation(Vec<Node>),
    Call {
        target: Target,
        group: GroupId,
    },
}

impl Node {
    /// Direct children, in pattern order.
    pub fn children(&self) -> Vec<&Node> {
        match &self.kind {
            NodeKind::Quantifier { body, .. } => vec![body.as_ref()],
            NodeKind::Group { kind, body } => {
                let mut out = vec![body.as_ref()];
                if let GroupKind::Conditional {
                    otherwise: Some(no),
                    ..
                } = kind
                {
                    out.push(no);
                }
                out
            }
            NodeKind::Anchor(Anchor::Look { body, .. }) => vec![body.as_ref()],
            NodeKind::Sequence(items) | NodeKind::Alternation(items) => items.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Mutable direct children, in pattern order.
    pub fn children_mut(&mut self) -> Vec<&mut Node> {
        match &mut self.kind {
            NodeKind::Quantifier { body, .. } => vec![body.as_mut()],
            NodeKind::Group { kind, body } => {
                let mut out = vec![body.as_mut()];
                if let GroupKind::Conditional {
                    otherwise: Some(no),
                    ..
                } = kind
                {
                    out.push(no);
                }
                out
            }
            NodeKind::Anchor(Anchor::Look { body, .. }) => vec![body.as_mut()],
            NodeKind::Sequence(items) | NodeKind::Alternation(items) => items.iter_mut().collect(),
            _ => Vec::new(),
        }
    }

    /// Capture group number, if this node is a capture group.
    pub fn capture_group(&self) -> Option<GroupId> {
        match &self.kind {
            NodeKind::Group {
                kind: GroupKind::Capture { group, .. },
                ..
            } => Some(*group),
            _ => None,
        }
    }

    /// Visits the node and all descendants, parents first.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }
}
