//! Instruction set and program container for the retrace regex engine.
//!
//! This crate contains:
//! - The instruction enum and its operand types
//! - Character class payloads and the group name table
//! - The immutable [`Program`] with its side tables and search hints
//! - Structural verification and a human-readable dump

mod class;
mod dump;
mod instr;
mod names;
mod program;
mod verify;

#[cfg(test)]
mod class_tests;
#[cfg(test)]
mod dump_tests;
#[cfg(test)]
mod names_tests;
#[cfg(test)]
mod verify_tests;

pub use class::{ByteMap, CharClass};
pub use dump::{dump, format_operands};
pub use instr::{
    Addr, GroupId, Instr, MarkId, NullCheckId, RepeatId, StateCheckId, SubexpId,
};
pub use names::NameTable;
pub use program::{
    AnchorHint, Program, ProgramFlags, ProgramMeta, RepeatInfo, SearchHints, Subexp,
};
pub use verify::ProgramError;
