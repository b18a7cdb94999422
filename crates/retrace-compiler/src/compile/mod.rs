//! Bytecode generation.
//!
//! Walks the analyzed tree and emits instructions whose address operands
//! are symbolic labels. Labels are bound to code positions as the code is
//! laid out and replaced by absolute addresses in the layout phase, which
//! also assembles the side tables and search hints.
//!
//! # Module Organization
//!
//! - `captures`: choice between plain and undoable capture instructions
//! - `expressions`: leaves, sequences, alternation, groups, anchors, calls
//! - `quantifier`: loops, unrolling and the explosion guard
//! - `lookaround`: lookahead, lookbehind, atomic and absent regions
//! - `hints`: search hints derived from the tree
//! - `layout`: label resolution and program assembly

mod captures;
mod error;
mod expressions;
mod hints;
mod layout;
mod lookaround;
mod quantifier;

#[cfg(test)]
mod compile_tests;

pub use error::CompileError;

use std::ops::Range;

use indexmap::IndexMap;
use retrace_bytecode::{
    Addr, GroupId, Instr, MarkId, NullCheckId, Program, ProgramFlags, RepeatId, StateCheckId, SubexpId,
};
use retrace_core::{EncodingRef, Options, Syntax, SyntaxBehavior};

use crate::analyze::{Analysis, CallGraph};
use crate::limits::CompileLimits;
use crate::parser::{Ast, GroupKind, Node, NodeFlags, NodeKind};

pub(crate) type CResult<T> = Result<T, CompileError>;

/// A code position that is known by name before it is known by address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Label(u32);

impl Label {
    /// Placeholder operand; rewritten to the bound position during layout.
    fn addr(self) -> Addr {
        Addr(self.0)
    }
}

/// Counted loop whose addresses are still labels.
struct PendingRepeat {
    min: u32,
    max: Option<u32>,
    greedy: bool,
    body: Label,
    exit: Label,
}

/// Subroutine whose entry and table ranges are filled in as it is emitted.
struct PendingSubexp {
    group: GroupId,
    entry: Label,
    captures: Range<GroupId>,
    repeats: Range<RepeatId>,
}

/// Code generator state for one pattern.
pub struct Compiler<'a> {
    ast: &'a Ast,
    calls: &'a CallGraph,
    enc: EncodingRef,
    options: Options,
    limits: &'a CompileLimits,
    code: Vec<Instr>,
    /// Code position of each label, once bound.
    labels: Vec<Option<u32>>,
    repeats: Vec<PendingRepeat>,
    subexps: Vec<PendingSubexp>,
    subexp_ids: IndexMap<GroupId, SubexpId>,
    /// First definition of every capture group.
    group_nodes: IndexMap<GroupId, &'a Node>,
    /// Groups that may use the non-undoable capture instructions.
    plain_captures: Vec<bool>,
    /// A changed capture makes an empty loop iteration count as progress.
    captures_matter: bool,
    /// Explosion-guard sites may be emitted.
    state_checks: bool,
    /// Null checks of the loop bodies enclosing the current position,
    /// innermost last.
    null_checks: Vec<NullCheckId>,
    /// Number of loop bodies enclosing the current position.
    loop_depth: u16,
    num_marks: u16,
    num_null_checks: u16,
    num_state_checks: StateCheckId,
    flags: ProgramFlags,
}

/// Generates a program for an analyzed tree.
///
/// `options` are the effective compile options (dialect defaults already
/// merged in), the same ones the tree was parsed with.
pub fn generate(
    ast: &Ast,
    analysis: &Analysis,
    syntax: &Syntax,
    options: Options,
    enc: EncodingRef,
    limits: &CompileLimits,
) -> Result<Program, CompileError> {
    let mut compiler = Compiler::new(ast, &analysis.calls, syntax, options, enc, limits);
    compiler.compile_program()?;
    layout::assemble(compiler)
}

impl<'a> Compiler<'a> {
    fn new(
        ast: &'a Ast,
        calls: &'a CallGraph,
        syntax: &Syntax,
        options: Options,
        enc: EncodingRef,
        limits: &'a CompileLimits,
    ) -> Self {
        let root = &ast.root;
        let mut group_nodes = IndexMap::new();
        let mut has_conditional = false;
        root.walk(&mut |n| {
            if let Some(group) = n.capture_group() {
                group_nodes.entry(group).or_insert(n);
            }
            has_conditional |= matches!(
                n.kind,
                NodeKind::Group {
                    kind: GroupKind::Conditional { .. },
                    ..
                }
            );
        });

        let history = options.contains(Options::CAPTURE_HISTORY);
        let plain_captures = captures::plain_groups(root, calls, ast.num_captures, history);
        let has_backref = root.info.flags.contains(NodeFlags::HAS_BACKREF);

        let mut flags = ProgramFlags::empty();
        flags.set(ProgramFlags::HAS_BACKREF, has_backref);
        flags.set(ProgramFlags::HAS_CALL, calls.has_calls());
        flags.set(
            ProgramFlags::BACKREF_UNSET_MATCHES_EMPTY,
            syntax.behaves(SyntaxBehavior::BACKREF_UNSET_MATCHES_EMPTY),
        );
        flags.set(ProgramFlags::CAPTURE_HISTORY, history);

        let state_checks = limits.get_explosion_depth() > 0
            && !options.contains(Options::FIND_LONGEST)
            && quantifier::guard_allowed(root);

        Self {
            ast,
            calls,
            enc,
            options,
            limits,
            code: Vec::new(),
            labels: Vec::new(),
            repeats: Vec::new(),
            subexps: Vec::new(),
            subexp_ids: IndexMap::new(),
            group_nodes,
            plain_captures,
            captures_matter: has_backref || has_conditional,
            state_checks,
            null_checks: Vec::new(),
            loop_depth: 0,
            num_marks: 0,
            num_null_checks: 0,
            num_state_checks: 0,
            flags,
        }
    }

    /// Emits the main code, `End`, then one subroutine per called group.
    fn compile_program(&mut self) -> CResult<()> {
        for group in 0..=self.ast.num_captures {
            if !self.calls.is_called(group) {
                continue;
            }
            let id = SubexpId::try_from(self.subexps.len()).map_err(|_| CompileError::TooMany("subroutines"))?;
            let entry = self.fresh_label();
            self.subexp_ids.insert(group, id);
            self.subexps.push(PendingSubexp {
                group,
                entry,
                captures: 0..0,
                repeats: 0..0,
            });
        }

        let ast = self.ast;
        if let Some(&whole) = self.subexp_ids.get(&0) {
            let entry = self.subexps[usize::from(whole)].entry;
            self.emit(Instr::Call {
                target: entry.addr(),
                subexp: whole,
            });
        } else {
            self.compile_node(&ast.root)?;
        }
        self.emit(Instr::End);

        for index in 0..self.subexps.len() {
            self.compile_subroutine(index)?;
        }

        log::debug!(
            "generated {} instructions, {} repeats, {} subroutines, {} guard sites",
            self.code.len(),
            self.repeats.len(),
            self.subexps.len(),
            self.num_state_checks,
        );
        Ok(())
    }

    fn compile_subroutine(&mut self, index: usize) -> CResult<()> {
        let group = self.subexps[index].group;
        let entry = self.subexps[index].entry;
        self.bind(entry);
        let repeats_start = self.repeats.len();

        let ast = self.ast;
        let node = if group == 0 {
            self.compile_node(&ast.root)?;
            &ast.root
        } else {
            let node = *self
                .group_nodes
                .get(&group)
                .ok_or(CompileError::MissingSubroutine(group))?;
            let NodeKind::Group { body, .. } = &node.kind else {
                return Err(CompileError::MissingSubroutine(group));
            };
            self.emit(Instr::MemStartPush(group));
            self.compile_node(body)?;
            if self.calls.is_recursive(group) {
                self.emit(Instr::MemEndRec(group));
            } else {
                self.emit(Instr::MemEndPush(group));
            }
            node
        };
        self.emit(Instr::Return);

        let repeats_end = self.repeats.len();
        let sub = &mut self.subexps[index];
        sub.captures = captures::group_range(node, group);
        sub.repeats = repeat_id(repeats_start)?..repeat_id(repeats_end)?;
        Ok(())
    }

    pub(super) fn fresh_label(&mut self) -> Label {
        let label = Label(self.labels.len() as u32);
        self.labels.push(None);
        label
    }

    /// Binds `label` to the next instruction to be emitted.
    pub(super) fn bind(&mut self, label: Label) {
        self.labels[label.0 as usize] = Some(self.code.len() as u32);
    }

    pub(super) fn emit(&mut self, instr: Instr) {
        self.code.push(instr);
    }

    pub(super) fn fresh_mark(&mut self) -> CResult<MarkId> {
        let id = self.num_marks;
        self.num_marks = id.checked_add(1).ok_or(CompileError::TooMany("lookaround regions"))?;
        Ok(id)
    }

    pub(super) fn fresh_null_check(&mut self) -> CResult<NullCheckId> {
        let id = self.num_null_checks;
        self.num_null_checks = id.checked_add(1).ok_or(CompileError::TooMany("loops"))?;
        Ok(id)
    }

    pub(super) fn fresh_state_check(&mut self) -> CResult<StateCheckId> {
        let id = self.num_state_checks;
        self.num_state_checks = id.checked_add(1).ok_or(CompileError::TooMany("guard sites"))?;
        Ok(id)
    }

    pub(super) fn add_repeat(
        &mut self,
        min: u32,
        max: Option<u32>,
        greedy: bool,
        body: Label,
        exit: Label,
    ) -> CResult<RepeatId> {
        let id = repeat_id(self.repeats.len())?;
        self.repeats.push(PendingRepeat {
            min,
            max,
            greedy,
            body,
            exit,
        });
        Ok(id)
    }
}

fn repeat_id(index: usize) -> CResult<RepeatId> {
    RepeatId::try_from(index).map_err(|_| CompileError::TooMany("counted repeats"))
}
