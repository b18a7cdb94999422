//! Compiled program container.

use std::ops::Range;

use bitflags::bitflags;
use retrace_core::{Colors, EncodingRef, Options};

use crate::class::ByteMap;
use crate::instr::{Addr, GroupId, Instr, RepeatId};
use crate::names::NameTable;
use crate::verify::{ProgramError, verify};

/// Bounds and layout of one counted loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatInfo {
    pub min: u32,
    /// `None` is unbounded.
    pub max: Option<u32>,
    pub greedy: bool,
    /// First instruction of the loop body.
    pub body: Addr,
    /// First instruction after the loop.
    pub exit: Addr,
}

/// A call target: a group compiled as a subroutine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subexp {
    /// Group number; 0 is the whole pattern.
    pub group: GroupId,
    pub entry: Addr,
    /// Capture groups inside the subroutine, saved across recursive re-entry.
    pub captures: Range<GroupId>,
    /// Counted loops inside the subroutine, saved across recursive re-entry.
    pub repeats: Range<RepeatId>,
}

bitflags! {
    /// Facts about a program the VM uses to pick strategies.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ProgramFlags: u32 {
        const HAS_BACKREF                 = 1 << 0;
        const HAS_CALL                    = 1 << 1;
        const HAS_LOOKBEHIND              = 1 << 2;
        const HAS_ABSENT                  = 1 << 3;
        const HAS_KEEP                    = 1 << 4;
        /// Explosion-guard sites were emitted.
        const STATE_CHECK                 = 1 << 5;
        const BACKREF_UNSET_MATCHES_EMPTY = 1 << 6;
        const CAPTURE_HISTORY             = 1 << 7;
    }
}

bitflags! {
    /// Positions a match can start at, derived from leading anchors.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AnchorHint: u8 {
        /// `\A`: only at offset 0.
        const BEGIN_BUF      = 1 << 0;
        /// `\G`: only at the search start.
        const BEGIN_POSITION = 1 << 1;
        /// `^`: only at offset 0 or after a newline.
        const BEGIN_LINE     = 1 << 2;
    }
}

/// Pre-checks the search loop uses to skip hopeless start offsets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHints {
    pub anchor: AnchorHint,
    /// Bytes every match starts with.
    pub prefix: Option<Box<[u8]>>,
    /// Bytes a match may start with; `None` when any byte may.
    pub first_bytes: Option<ByteMap>,
    /// Lower bound on the byte length of a match.
    pub min_len: usize,
}

/// Tables and counts produced alongside the code.
#[derive(Debug, Clone, Default)]
pub struct ProgramMeta {
    pub repeats: Vec<RepeatInfo>,
    pub subexps: Vec<Subexp>,
    pub names: NameTable,
    /// Number of capture groups, not counting group 0.
    pub num_captures: u16,
    pub num_marks: u16,
    pub num_null_checks: u16,
    pub num_state_checks: u32,
    pub options: Options,
    pub flags: ProgramFlags,
    pub hints: SearchHints,
}

/// An immutable compiled pattern, shareable across threads.
#[derive(Debug, Clone)]
pub struct Program {
    code: Box<[Instr]>,
    meta: ProgramMeta,
    encoding: EncodingRef,
}

impl Program {
    /// Assembles a program, checking every operand against the tables.
    pub fn new(code: Vec<Instr>, meta: ProgramMeta, encoding: EncodingRef) -> Result<Self, ProgramError> {
        verify(&code, &meta)?;
        Ok(Self {
            code: code.into_boxed_slice(),
            meta,
            encoding,
        })
    }

    #[inline]
    pub fn instr(&self, addr: Addr) -> &Instr {
        &self.code[addr.index()]
    }

    pub fn code(&self) -> &[Instr] {
        &self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn encoding(&self) -> EncodingRef {
        self.encoding
    }

    #[inline]
    pub fn repeat(&self, id: RepeatId) -> &RepeatInfo {
        &self.meta.repeats[id as usize]
    }

    pub fn repeats(&self) -> &[RepeatInfo] {
        &self.meta.repeats
    }

    pub fn subexps(&self) -> &[Subexp] {
        &self.meta.subexps
    }

    pub fn names(&self) -> &NameTable {
        &self.meta.names
    }

    pub fn num_captures(&self) -> u16 {
        self.meta.num_captures
    }

    pub fn num_marks(&self) -> u16 {
        self.meta.num_marks
    }

    pub fn num_null_checks(&self) -> u16 {
        self.meta.num_null_checks
    }

    pub fn num_state_checks(&self) -> u32 {
        self.meta.num_state_checks
    }

    pub fn options(&self) -> Options {
        self.meta.options
    }

    pub fn flags(&self) -> ProgramFlags {
        self.meta.flags
    }

    pub fn hints(&self) -> &SearchHints {
        &self.meta.hints
    }

    pub fn meta(&self) -> &ProgramMeta {
        &self.meta
    }

    /// Human-readable listing of the code and side tables.
    pub fn dump(&self, colors: Colors) -> String {
        crate::dump::dump(self, colors)
    }
}
