//! Capture table.
//!
//! Each group has a pending start, written when the group is entered, and
//! the span of its last completed match. Undo records live on the frame
//! stack, so the table itself only ever holds the current values.

use std::ops::Range;

use retrace_bytecode::GroupId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Slot {
    pub(crate) start: Option<usize>,
    pub(crate) span: Option<(usize, usize)>,
}

/// One completed group match, in the order the match path produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HistoryEntry {
    pub(crate) group: GroupId,
    pub(crate) start: usize,
    pub(crate) end: usize,
}

#[derive(Debug, Default)]
pub(crate) struct CaptureTable {
    slots: Vec<Slot>,
    history: Vec<HistoryEntry>,
}

impl CaptureTable {
    /// Clears every group; `num_captures` excludes group 0.
    pub(crate) fn reset(&mut self, num_captures: u16) {
        self.slots.clear();
        self.slots.resize(usize::from(num_captures) + 1, Slot::default());
        self.history.clear();
    }

    #[inline]
    pub(crate) fn slot(&self, group: GroupId) -> Slot {
        self.slots[usize::from(group)]
    }

    #[inline]
    pub(crate) fn restore(&mut self, group: GroupId, slot: Slot) {
        self.slots[usize::from(group)] = slot;
    }

    #[inline]
    pub(crate) fn start(&mut self, group: GroupId, pos: usize) {
        self.slots[usize::from(group)].start = Some(pos);
    }

    /// Completes `group` at `pos`. Returns false if the group was never entered.
    #[inline]
    pub(crate) fn end(&mut self, group: GroupId, pos: usize) -> bool {
        let slot = &mut self.slots[usize::from(group)];
        let Some(start) = slot.start else {
            return false;
        };
        slot.span = Some((start, pos));
        true
    }

    #[inline]
    pub(crate) fn span(&self, group: GroupId) -> Option<(usize, usize)> {
        self.slots.get(usize::from(group)).and_then(|s| s.span)
    }

    #[inline]
    pub(crate) fn is_set(&self, group: GroupId) -> bool {
        self.span(group).is_some()
    }

    pub(crate) fn spans(&self) -> impl Iterator<Item = Option<(usize, usize)>> + '_ {
        self.slots.iter().map(|s| s.span)
    }

    pub(crate) fn record(&mut self, group: GroupId, start: usize, end: usize) {
        self.history.push(HistoryEntry { group, start, end });
    }

    pub(crate) fn history_len(&self) -> u32 {
        self.history.len() as u32
    }

    pub(crate) fn truncate_history(&mut self, len: u32) {
        self.history.truncate(len as usize);
    }

    pub(crate) fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Pending starts of `groups`, for saving across a call.
    pub(crate) fn starts(&self, groups: Range<GroupId>) -> Vec<Option<usize>> {
        groups.map(|g| self.slots[usize::from(g)].start).collect()
    }

    pub(crate) fn set_starts(&mut self, groups: Range<GroupId>, starts: &[Option<usize>]) {
        for (g, start) in groups.zip(starts) {
            self.slots[usize::from(g)].start = *start;
        }
    }
}
