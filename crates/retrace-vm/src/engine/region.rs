//! Match results.

use std::ops::Range;

use retrace_bytecode::{GroupId, NameTable};
use serde::Serialize;

use super::captures::HistoryEntry;

/// Byte span of a group match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.range()
    }
}

/// Offsets of a successful match.
///
/// Slot 0 is the whole match; slot `n` is capture group `n`, `None` when
/// the group did not participate. With capture history enabled, every
/// completed span of every group along the match path is kept as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    spans: Vec<Option<Span>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    history: Option<Vec<Vec<Span>>>,
}

impl Region {
    pub(crate) fn new(spans: Vec<Option<Span>>) -> Self {
        Self { spans, history: None }
    }

    /// Groups the history log by group number; group 0 gets the whole match.
    pub(crate) fn with_history(mut self, log: &[HistoryEntry]) -> Self {
        let mut history = vec![Vec::new(); self.spans.len()];
        if let Some(whole) = self.spans.first().copied().flatten() {
            history[0].push(whole);
        }
        for entry in log {
            if let Some(list) = history.get_mut(usize::from(entry.group)) {
                list.push(Span::new(entry.start, entry.end));
            }
        }
        self.history = Some(history);
        self
    }

    /// Number of slots, including group 0.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Span of group `group`, if it participated.
    pub fn pos(&self, group: usize) -> Option<Span> {
        self.spans.get(group).copied().flatten()
    }

    pub fn start(&self, group: usize) -> Option<usize> {
        self.pos(group).map(|s| s.start)
    }

    pub fn end(&self, group: usize) -> Option<usize> {
        self.pos(group).map(|s| s.end)
    }

    /// The whole match.
    pub fn whole(&self) -> Span {
        self.pos(0).unwrap_or(Span::new(0, 0))
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<Span>> + '_ {
        self.spans.iter().copied()
    }

    /// Completed spans of `group` in match order; `None` without capture history.
    pub fn history(&self, group: usize) -> Option<&[Span]> {
        self.history.as_ref()?.get(group).map(Vec::as_slice)
    }

    /// Resolves `name` to the group it refers to in this match: the last
    /// group with that name that participated, else the last one defined.
    pub fn name_to_group(&self, names: &NameTable, name: &str) -> Option<GroupId> {
        names.resolve(name, |g| self.pos(usize::from(g)).is_some())
    }

    /// Span of the group `name` resolves to.
    pub fn named(&self, names: &NameTable, name: &str) -> Option<Span> {
        self.pos(usize::from(self.name_to_group(names, name)?))
    }
}
