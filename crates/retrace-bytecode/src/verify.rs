//! Structural verification of compiled programs.
//!
//! Every address operand must land inside the code and every id must index
//! its table. A failure here is a compiler bug, never a user error.

use crate::instr::{Addr, Instr};
use crate::program::ProgramMeta;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    #[error("program has no instructions")]
    Empty,
    #[error("last instruction {0} falls off the end of the program")]
    FallsOffEnd(Addr),
    #[error("{at}: jump target {target} outside program")]
    AddressOutOfRange { at: Addr, target: Addr },
    #[error("{at}: group {group} exceeds capture count")]
    GroupOutOfRange { at: Addr, group: u16 },
    #[error("{at}: repeat id {id} not in repeat table")]
    UnknownRepeat { at: Addr, id: u16 },
    #[error("repeat {id}: body or exit outside program")]
    RepeatLayout { id: u16 },
    #[error("{at}: mark id {id} not allocated")]
    UnknownMark { at: Addr, id: u16 },
    #[error("{at}: null-check id {id} not allocated")]
    UnknownNullCheck { at: Addr, id: u16 },
    #[error("{at}: state-check id {id} not allocated")]
    UnknownStateCheck { at: Addr, id: u32 },
    #[error("{at}: subexpression {id} not in call table")]
    UnknownSubexp { at: Addr, id: u16 },
    #[error("{at}: step-back bounds {min}..{max} inverted")]
    StepBackBounds { at: Addr, min: u32, max: u32 },
}

pub(crate) fn verify(code: &[Instr], meta: &ProgramMeta) -> Result<(), ProgramError> {
    let Some(last) = code.last() else {
        return Err(ProgramError::Empty);
    };
    let len = code.len();
    if !last.is_terminal() {
        return Err(ProgramError::FallsOffEnd(Addr(len as u32 - 1)));
    }

    for (i, instr) in code.iter().enumerate() {
        let at = Addr(i as u32);
        for target in instr.addrs() {
            if target.index() >= len {
                return Err(ProgramError::AddressOutOfRange { at, target });
            }
        }
        match instr {
            Instr::MemStart(g)
            | Instr::MemStartPush(g)
            | Instr::MemEnd(g)
            | Instr::MemEndPush(g)
            | Instr::MemEndRec(g) => check_group(at, *g, meta)?,
            Instr::BackRef { groups, .. } | Instr::CondRef { groups, .. } => {
                for &g in groups.iter() {
                    check_group(at, g, meta)?;
                }
            }
            Instr::Repeat(id) | Instr::RepeatInc(id) => {
                if *id as usize >= meta.repeats.len() {
                    return Err(ProgramError::UnknownRepeat { at, id: *id });
                }
            }
            Instr::PushPos(id)
            | Instr::PopPos(id)
            | Instr::AtomicStart(id)
            | Instr::AtomicEnd(id)
            | Instr::PopToMark(id)
            | Instr::PosCheck(id) => {
                if *id >= meta.num_marks {
                    return Err(ProgramError::UnknownMark { at, id: *id });
                }
            }
            Instr::NullCheckStart(id) | Instr::NullCheckEnd { id, .. } => {
                if *id >= meta.num_null_checks {
                    return Err(ProgramError::UnknownNullCheck { at, id: *id });
                }
            }
            Instr::StateCheck { id, within } => {
                if *id >= meta.num_state_checks {
                    return Err(ProgramError::UnknownStateCheck { at, id: *id });
                }
                if let Some(check) = within
                    && *check >= meta.num_null_checks
                {
                    return Err(ProgramError::UnknownNullCheck { at, id: *check });
                }
            }
            Instr::Call { subexp, .. } => {
                if *subexp as usize >= meta.subexps.len() {
                    return Err(ProgramError::UnknownSubexp { at, id: *subexp });
                }
            }
            Instr::StepBack { min, max: Some(max) } if max < min => {
                return Err(ProgramError::StepBackBounds {
                    at,
                    min: *min,
                    max: *max,
                });
            }
            _ => {}
        }
    }

    for (id, repeat) in meta.repeats.iter().enumerate() {
        if repeat.body.index() >= len || repeat.exit.index() >= len {
            return Err(ProgramError::RepeatLayout { id: id as u16 });
        }
    }
    Ok(())
}

fn check_group(at: Addr, group: u16, meta: &ProgramMeta) -> Result<(), ProgramError> {
    if group == 0 || group > meta.num_captures {
        return Err(ProgramError::GroupOutOfRange { at, group });
    }
    Ok(())
}
