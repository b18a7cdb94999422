//! Backtrack frames.
//!
//! A single LIFO stack holds alternatives, undo records and region
//! markers. Failure pops frames until one of them resumes execution,
//! undoing every state change recorded on the way down.
//!
//! Calls and returns live on the same stack. Scans for a marker only look
//! at frames of the current invocation: frames between a `Return` and its
//! matching `Call` belong to a finished inner invocation and are skipped.

use retrace_bytecode::{Addr, GroupId, MarkId, NullCheckId, RepeatId, StateCheckId, SubexpId};

use super::captures::Slot;

/// Values a subroutine call saves and a return puts back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CallState {
    pub(crate) starts: Vec<Option<usize>>,
    pub(crate) counts: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Frame {
    /// Resume at `ip` with the position reset to `pos`.
    Alt { ip: Addr, pos: usize },
    /// Lookbehind start: resume at `ip` one character further back than
    /// `pos`, up to `remaining` more times.
    StepBack { ip: Addr, pos: usize, remaining: u32 },
    /// Undo record for a capture write.
    Capture { group: GroupId, prev: Slot, history: u32 },
    /// Undo record for a repeat counter write.
    Repeat { id: RepeatId, prev: u32 },
    /// Lookahead or lookbehind start.
    SavedPos { mark: MarkId, pos: usize },
    AtomicMark { mark: MarkId },
    NullCheck { id: NullCheckId, pos: usize },
    /// Active subroutine call.
    Call { ret: Addr, subexp: SubexpId, saved: Box<CallState> },
    /// Completed return; `undo` holds the callee's values it replaced.
    Return { subexp: SubexpId, undo: Box<CallState> },
    Keep { prev: Option<usize> },
    /// Explosion-guard site entered at `pos`; popping it records a failure.
    StateCheck { id: StateCheckId, pos: usize },
    /// Absent operator: the span starting at `start` may still shrink below `end`.
    Absent { ip: Addr, start: usize, end: usize },
    /// Inert filler left where a frame was discarded in place.
    Void,
}

impl Frame {
    /// Frames dropped when a region commits.
    fn is_choice(&self) -> bool {
        matches!(
            self,
            Frame::Alt { .. } | Frame::StepBack { .. } | Frame::Absent { .. } | Frame::StateCheck { .. }
        )
    }
}

#[derive(Debug, Default)]
pub(crate) struct FrameStack {
    frames: Vec<Frame>,
}

impl FrameStack {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    #[inline]
    pub(crate) fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn clear(&mut self) {
        self.frames.clear();
    }

    pub(crate) fn above(&self, index: usize) -> &[Frame] {
        &self.frames[index + 1..]
    }

    /// Index of the topmost frame of the current invocation matching `pred`.
    pub(crate) fn find(&self, pred: impl Fn(&Frame) -> bool) -> Option<usize> {
        let mut level = 0u32;
        for (i, frame) in self.frames.iter().enumerate().rev() {
            match frame {
                Frame::Return { .. } => level += 1,
                Frame::Call { .. } => {
                    if level == 0 {
                        return None;
                    }
                    level -= 1;
                }
                _ if level == 0 && pred(frame) => return Some(i),
                _ => {}
            }
        }
        None
    }

    /// Index and saved position of the lookaround started under `mark`.
    pub(crate) fn saved_pos(&self, mark: MarkId) -> Option<(usize, usize)> {
        let index = self.find(|f| matches!(f, Frame::SavedPos { mark: m, .. } if *m == mark))?;
        match self.frames[index] {
            Frame::SavedPos { pos, .. } => Some((index, pos)),
            _ => None,
        }
    }

    pub(crate) fn atomic(&self, mark: MarkId) -> Option<usize> {
        self.find(|f| matches!(f, Frame::AtomicMark { mark: m } if *m == mark))
    }

    /// Index and entry position of the innermost iteration checked by `id`.
    pub(crate) fn null_check(&self, id: NullCheckId) -> Option<(usize, usize)> {
        let index = self.find(|f| matches!(f, Frame::NullCheck { id: i, .. } if *i == id))?;
        match self.frames[index] {
            Frame::NullCheck { pos, .. } => Some((index, pos)),
            _ => None,
        }
    }

    /// The call the current invocation runs under.
    pub(crate) fn current_call(&self) -> Option<(Addr, SubexpId, &CallState)> {
        let mut level = 0u32;
        for frame in self.frames.iter().rev() {
            match frame {
                Frame::Return { .. } => level += 1,
                Frame::Call { ret, subexp, saved } if level == 0 => return Some((*ret, *subexp, saved)),
                Frame::Call { .. } => level -= 1,
                _ => {}
            }
        }
        None
    }

    /// Commits the region opened at `index`: the marker and every choice
    /// above it become void, undo records stay.
    pub(crate) fn cut(&mut self, index: usize) {
        self.frames[index] = Frame::Void;
        for frame in &mut self.frames[index + 1..] {
            if frame.is_choice() {
                *frame = Frame::Void;
            }
        }
        while matches!(self.frames.last(), Some(Frame::Void)) {
            self.frames.pop();
        }
    }
}
