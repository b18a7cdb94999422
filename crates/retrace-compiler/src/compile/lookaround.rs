//! Regions that control backtracking: lookaround, atomic and absent groups.
//!
//! Shapes:
//! - `(?=X)`: `PushPos m; X; PopPos m`
//! - `(?<=X)`: `PushPos m; StepBack min..max; X; PosCheck m; PopPos m`
//! - `(?!X)`, `(?<!X)`: `Push ok; PushPos m; [StepBack] X; [PosCheck m]; PopToMark m; Pop; Fail; ok:`
//! - `(?>X)`: `AtomicStart m; X; AtomicEnd m`
//! - `(?~X)`: `Absent body; Jump after; body: X; AbsentEnd; after:`

use retrace_bytecode::{Instr, ProgramFlags};

use super::{CResult, Compiler};
use crate::parser::Node;

impl Compiler<'_> {
    pub(super) fn compile_look(&mut self, behind: bool, negated: bool, body: &Node) -> CResult<()> {
        let mark = self.fresh_mark()?;
        if behind {
            self.flags |= ProgramFlags::HAS_LOOKBEHIND;
        }

        let ok = negated.then(|| self.fresh_label());
        if let Some(ok) = ok {
            self.emit(Instr::Push(ok.addr()));
        }
        self.emit(Instr::PushPos(mark));
        if behind {
            self.emit(Instr::StepBack {
                min: body.info.min_chars,
                max: body.info.max_chars,
            });
        }
        self.compile_node(body)?;
        if behind {
            self.emit(Instr::PosCheck(mark));
        }
        if let Some(ok) = ok {
            self.emit(Instr::PopToMark(mark));
            self.emit(Instr::Pop);
            self.emit(Instr::Fail);
            self.bind(ok);
        } else {
            self.emit(Instr::PopPos(mark));
        }
        Ok(())
    }

    pub(super) fn compile_atomic(&mut self, body: &Node) -> CResult<()> {
        let mark = self.fresh_mark()?;
        self.emit(Instr::AtomicStart(mark));
        self.compile_node(body)?;
        self.emit(Instr::AtomicEnd(mark));
        Ok(())
    }

    pub(super) fn compile_absent(&mut self, body: &Node) -> CResult<()> {
        self.flags |= ProgramFlags::HAS_ABSENT;
        let start = self.fresh_label();
        let after = self.fresh_label();
        self.emit(Instr::Absent { body: start.addr() });
        self.emit(Instr::Jump(after.addr()));
        self.bind(start);
        self.compile_node(body)?;
        self.emit(Instr::AbsentEnd);
        self.bind(after);
        Ok(())
    }
}
