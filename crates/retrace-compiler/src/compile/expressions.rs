//! Leaf and structural node compilation.

use retrace_bytecode::{CharClass, GroupId, Instr, ProgramFlags};
use retrace_core::encoding::fold_str;

use super::{CResult, CompileError, Compiler};
use crate::parser::{Anchor, GroupKind, Node, NodeKind};

impl Compiler<'_> {
    pub(super) fn compile_node(&mut self, node: &Node) -> CResult<()> {
        self.compile_node_before(node, None)
    }

    /// Compiles `node`; `next` is the node that follows it in its sequence,
    /// used to let a greedy `.*` peek at the literal after it.
    pub(super) fn compile_node_before(&mut self, node: &Node, next: Option<&Node>) -> CResult<()> {
        match &node.kind {
            NodeKind::Empty => {}
            NodeKind::Literal { bytes, ignore_case } => self.compile_literal(bytes, *ignore_case),
            NodeKind::Class { ranges, negated } => {
                self.emit(Instr::Class(Box::new(CharClass::from_ranges(ranges, *negated))));
            }
            NodeKind::CharType { ctype, negated, ascii } => self.emit(Instr::CType {
                ctype: *ctype,
                negated: *negated,
                ascii: *ascii,
            }),
            NodeKind::AnyChar { multiline: true } => self.emit(Instr::AnyCharMl),
            NodeKind::AnyChar { multiline: false } => self.emit(Instr::AnyChar),
            NodeKind::BackRef {
                groups, ignore_case, ..
            } => self.emit(Instr::BackRef {
                groups: groups.clone().into_boxed_slice(),
                ignore_case: *ignore_case,
            }),
            NodeKind::Quantifier { .. } => self.compile_quantifier(node, next)?,
            NodeKind::Group { kind, body } => match kind {
                GroupKind::Capture { group, .. } => self.compile_capture(*group, body)?,
                GroupKind::NonCapture => self.compile_node(body)?,
                GroupKind::Atomic => self.compile_atomic(body)?,
                GroupKind::Conditional { groups, otherwise, .. } => {
                    self.compile_conditional(groups, body, otherwise.as_deref())?;
                }
                GroupKind::Absent => self.compile_absent(body)?,
            },
            NodeKind::Anchor(anchor) => self.compile_anchor(anchor)?,
            NodeKind::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.compile_node_before(item, items.get(i + 1))?;
                }
            }
            NodeKind::Alternation(branches) => self.compile_alternation(branches)?,
            NodeKind::Call { group, .. } => self.compile_call(*group)?,
        }
        Ok(())
    }

    fn compile_literal(&mut self, bytes: &[u8], ignore_case: bool) {
        match (bytes, ignore_case) {
            ([], _) => {}
            (_, true) => self.emit(Instr::StrIc(fold_str(self.enc, bytes).into_boxed_slice())),
            ([b], false) => self.emit(Instr::Byte(*b)),
            (_, false) => self.emit(Instr::Str(bytes.into())),
        }
    }

    /// `Push L1; A; Jump end; L1: Push L2; B; Jump end; L2: C; end:`
    fn compile_alternation(&mut self, branches: &[Node]) -> CResult<()> {
        let end = self.fresh_label();
        let last = branches.len().saturating_sub(1);
        for (i, branch) in branches.iter().enumerate() {
            if i == last {
                self.compile_node(branch)?;
                break;
            }
            let next = self.fresh_label();
            self.emit(Instr::Push(next.addr()));
            self.compile_node(branch)?;
            self.emit(Instr::Jump(end.addr()));
            self.bind(next);
        }
        self.bind(end);
        Ok(())
    }

    fn compile_capture(&mut self, group: GroupId, body: &Node) -> CResult<()> {
        if self.calls.is_called(group) {
            return self.compile_call(group);
        }
        let plain = self.plain_captures.get(usize::from(group)).copied().unwrap_or(false);
        self.emit(if plain {
            Instr::MemStart(group)
        } else {
            Instr::MemStartPush(group)
        });
        self.compile_node(body)?;
        self.emit(if plain {
            Instr::MemEnd(group)
        } else {
            Instr::MemEndPush(group)
        });
        Ok(())
    }

    pub(super) fn compile_call(&mut self, group: GroupId) -> CResult<()> {
        let subexp = *self
            .subexp_ids
            .get(&group)
            .ok_or(CompileError::MissingSubroutine(group))?;
        let entry = self.subexps[usize::from(subexp)].entry;
        self.emit(Instr::Call {
            target: entry.addr(),
            subexp,
        });
        Ok(())
    }

    /// `CondRef groups, no; yes; Jump end; no: otherwise; end:`
    fn compile_conditional(&mut self, groups: &[GroupId], yes: &Node, otherwise: Option<&Node>) -> CResult<()> {
        let no = self.fresh_label();
        let end = self.fresh_label();
        self.emit(Instr::CondRef {
            groups: groups.into(),
            otherwise: no.addr(),
        });
        self.compile_node(yes)?;
        self.emit(Instr::Jump(end.addr()));
        self.bind(no);
        if let Some(otherwise) = otherwise {
            self.compile_node(otherwise)?;
        }
        self.bind(end);
        Ok(())
    }

    fn compile_anchor(&mut self, anchor: &Anchor) -> CResult<()> {
        let instr = match anchor {
            Anchor::BeginBuf => Instr::BeginBuf,
            Anchor::EndBuf => Instr::EndBuf,
            Anchor::SemiEndBuf => Instr::SemiEndBuf,
            Anchor::BeginLine => Instr::BeginLine,
            Anchor::EndLine => Instr::EndLine,
            Anchor::BeginPosition => Instr::BeginPosition,
            Anchor::WordBoundary { ascii } => Instr::WordBoundary { ascii: *ascii },
            Anchor::NotWordBoundary { ascii } => Instr::NotWordBoundary { ascii: *ascii },
            Anchor::WordBegin { ascii } => Instr::WordBegin { ascii: *ascii },
            Anchor::WordEnd { ascii } => Instr::WordEnd { ascii: *ascii },
            Anchor::Keep => {
                self.flags |= ProgramFlags::HAS_KEEP;
                Instr::Keep
            }
            Anchor::Look { behind, negated, body } => {
                return self.compile_look(*behind, *negated, body);
            }
        };
        self.emit(instr);
        Ok(())
    }
}
