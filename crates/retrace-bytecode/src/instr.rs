//! Instruction set.
//!
//! Every instruction is a variant carrying exactly the operands it needs.
//! Addresses are absolute indices into the program's code; the compiler
//! resolves all of them before a [`crate::Program`] exists.

use std::fmt;

use retrace_core::CharType;

use crate::class::CharClass;

/// Absolute instruction address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Addr(pub u32);

impl Addr {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn next(self) -> Addr {
        Addr(self.0 + 1)
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Capture group number. Group 0 is the whole match.
pub type GroupId = u16;

/// Id of a counted loop, indexing [`crate::Program::repeats`].
pub type RepeatId = u16;

/// Id shared by the instructions that open and close one lookaround or atomic region.
pub type MarkId = u16;

/// Id of a null-check pair.
pub type NullCheckId = u16;

/// Id of an explosion-guard site.
pub type StateCheckId = u32;

/// Index into [`crate::Program::subexps`].
pub type SubexpId = u16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    /// Accept: the match ends at the current position.
    End,

    /// One literal byte.
    Byte(u8),
    /// Literal bytes.
    Str(Box<[u8]>),
    /// Case-insensitive literal; the payload is already case-folded.
    StrIc(Box<[u8]>),
    Class(Box<CharClass>),
    CType {
        ctype: CharType,
        negated: bool,
        /// Only ASCII characters can have the type.
        ascii: bool,
    },
    /// Any character except a newline.
    AnyChar,
    /// Any character including a newline.
    AnyCharMl,
    /// Greedy `.*`: consumes characters, leaving an alternative at each step.
    AnyCharStar { multiline: bool },
    /// Greedy `.*` followed by a literal starting with `next`: alternatives
    /// are only left where `next` follows.
    AnyCharStarPeekNext { multiline: bool, next: u8 },

    WordBoundary { ascii: bool },
    NotWordBoundary { ascii: bool },
    WordBegin { ascii: bool },
    WordEnd { ascii: bool },
    BeginBuf,
    EndBuf,
    /// End of buffer, or before a final newline.
    SemiEndBuf,
    BeginLine,
    EndLine,
    /// The position the search started from (`\G`).
    BeginPosition,

    /// Match the text last captured by one of `groups`, tried last to first.
    BackRef { groups: Box<[GroupId]>, ignore_case: bool },
    /// Continue if any of `groups` has a capture, else jump to `otherwise`.
    CondRef { groups: Box<[GroupId]>, otherwise: Addr },

    MemStart(GroupId),
    /// Group start whose previous value must be restorable on backtrack.
    MemStartPush(GroupId),
    MemEnd(GroupId),
    MemEndPush(GroupId),
    /// End of a group that is re-entered through recursive calls.
    MemEndRec(GroupId),
    /// `\K`: the reported match starts here.
    Keep,

    Fail,
    Jump(Addr),
    /// Leave an alternative at `Addr` and fall through.
    Push(Addr),
    /// Discard the alternative on top of the stack.
    Pop,

    /// Enter a counted loop; bounds and addresses live in the repeat table.
    Repeat(RepeatId),
    /// End of one iteration of a counted loop.
    RepeatInc(RepeatId),

    NullCheckStart(NullCheckId),
    /// If the iteration consumed nothing, skip the next instruction.
    /// With `captures`, an iteration that changed a capture is not empty.
    NullCheckEnd { id: NullCheckId, captures: bool },

    /// Save the position under a mark (lookaround start).
    PushPos(MarkId),
    /// Commit the lookaround and restore the saved position.
    PopPos(MarkId),
    AtomicStart(MarkId),
    /// Commit the atomic region: alternatives inside it are dropped.
    AtomicEnd(MarkId),
    /// Unwind everything since the mark, undoing captures (negative lookaround).
    PopToMark(MarkId),
    /// Step back between `min` and `max` characters (`None`: to the buffer
    /// start), nearest first.
    StepBack { min: u32, max: Option<u32> },
    /// Fail unless the position equals the one saved under the mark.
    PosCheck(MarkId),

    Call { target: Addr, subexp: SubexpId },
    Return,

    /// Explosion guard: fail if this site already failed at this position.
    /// Inside a loop body that can match empty, `within` names its null
    /// check; the guard then only applies once that iteration has consumed
    /// input.
    StateCheck {
        id: StateCheckId,
        within: Option<NullCheckId>,
    },

    /// Absent operator `(?~...)`: body at `body`, ending in `AbsentEnd`.
    Absent { body: Addr },
    AbsentEnd,
}

impl Instr {
    /// Mnemonic used by dumps and traces.
    pub fn name(&self) -> &'static str {
        match self {
            Instr::End => "end",
            Instr::Byte(_) => "byte",
            Instr::Str(_) => "str",
            Instr::StrIc(_) => "str-ic",
            Instr::Class(_) => "cclass",
            Instr::CType { .. } => "ctype",
            Instr::AnyChar => "any",
            Instr::AnyCharMl => "any-ml",
            Instr::AnyCharStar { .. } => "any*",
            Instr::AnyCharStarPeekNext { .. } => "any*-peek",
            Instr::WordBoundary { .. } => "word-bound",
            Instr::NotWordBoundary { .. } => "not-word-bound",
            Instr::WordBegin { .. } => "word-begin",
            Instr::WordEnd { .. } => "word-end",
            Instr::BeginBuf => "begin-buf",
            Instr::EndBuf => "end-buf",
            Instr::SemiEndBuf => "semi-end-buf",
            Instr::BeginLine => "begin-line",
            Instr::EndLine => "end-line",
            Instr::BeginPosition => "begin-position",
            Instr::BackRef { .. } => "backref",
            Instr::CondRef { .. } => "cond-ref",
            Instr::MemStart(_) => "mem-start",
            Instr::MemStartPush(_) => "mem-start-push",
            Instr::MemEnd(_) => "mem-end",
            Instr::MemEndPush(_) => "mem-end-push",
            Instr::MemEndRec(_) => "mem-end-rec",
            Instr::Keep => "keep",
            Instr::Fail => "fail",
            Instr::Jump(_) => "jump",
            Instr::Push(_) => "push",
            Instr::Pop => "pop",
            Instr::Repeat(_) => "repeat",
            Instr::RepeatInc(_) => "repeat-inc",
            Instr::NullCheckStart(_) => "null-check-start",
            Instr::NullCheckEnd { .. } => "null-check-end",
            Instr::PushPos(_) => "push-pos",
            Instr::PopPos(_) => "pop-pos",
            Instr::AtomicStart(_) => "atomic-start",
            Instr::AtomicEnd(_) => "atomic-end",
            Instr::PopToMark(_) => "pop-to-mark",
            Instr::StepBack { .. } => "step-back",
            Instr::PosCheck(_) => "pos-check",
            Instr::Call { .. } => "call",
            Instr::Return => "return",
            Instr::StateCheck { .. } => "state-check",
            Instr::Absent { .. } => "absent",
            Instr::AbsentEnd => "absent-end",
        }
    }

    /// Visits every address operand mutably (used for label resolution).
    pub fn map_addrs(&mut self, mut f: impl FnMut(Addr) -> Addr) {
        match self {
            Instr::CondRef { otherwise, .. } => *otherwise = f(*otherwise),
            Instr::Jump(addr) | Instr::Push(addr) => *addr = f(*addr),
            Instr::Call { target, .. } => *target = f(*target),
            Instr::Absent { body } => *body = f(*body),
            _ => {}
        }
    }

    /// Address operands of this instruction.
    pub fn addrs(&self) -> impl Iterator<Item = Addr> {
        let addr = match self {
            Instr::CondRef { otherwise, .. } => Some(*otherwise),
            Instr::Jump(addr) | Instr::Push(addr) => Some(*addr),
            Instr::Call { target, .. } => Some(*target),
            Instr::Absent { body } => Some(*body),
            _ => None,
        };
        addr.into_iter()
    }

    /// True for instructions that never fall through to the next address.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Instr::End | Instr::Fail | Instr::Jump(_) | Instr::Return | Instr::AbsentEnd
        )
    }
}
