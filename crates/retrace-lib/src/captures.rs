//! Match views over a subject.

use std::ops::Range;

use retrace_bytecode::NameTable;
use retrace_vm::{Region, Span};

/// A matched span, borrowed from the subject it was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'s> {
    subject: &'s [u8],
    span: Span,
}

impl<'s> Match<'s> {
    pub(crate) fn new(subject: &'s [u8], span: Span) -> Self {
        Self { subject, span }
    }

    pub fn start(&self) -> usize {
        self.span.start
    }

    pub fn end(&self) -> usize {
        self.span.end
    }

    pub fn range(&self) -> Range<usize> {
        self.span.range()
    }

    pub fn len(&self) -> usize {
        self.span.len()
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn as_bytes(&self) -> &'s [u8] {
        &self.subject[self.range()]
    }

    /// The matched text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&'s str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }
}

/// Capture groups of one match.
///
/// Group 0 is the whole match. Named groups resolve against this match:
/// a name shared by several groups refers to the last one that took part.
#[derive(Debug, Clone)]
pub struct Captures<'r, 's> {
    subject: &'s [u8],
    region: Region,
    names: &'r NameTable,
}

impl<'r, 's> Captures<'r, 's> {
    pub(crate) fn new(subject: &'s [u8], region: Region, names: &'r NameTable) -> Self {
        Self {
            subject,
            region,
            names,
        }
    }

    /// Group `index`, if it participated in the match.
    pub fn get(&self, index: usize) -> Option<Match<'s>> {
        self.region.pos(index).map(|span| Match::new(self.subject, span))
    }

    /// The group `name` resolves to in this match.
    pub fn name(&self, name: &str) -> Option<Match<'s>> {
        self.region
            .named(self.names, name)
            .map(|span| Match::new(self.subject, span))
    }

    /// The whole match.
    pub fn whole(&self) -> Match<'s> {
        Match::new(self.subject, self.region.whole())
    }

    /// Number of groups, including group 0.
    pub fn len(&self) -> usize {
        self.region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<Match<'s>>> + '_ {
        self.region
            .iter()
            .map(|span| span.map(|span| Match::new(self.subject, span)))
    }

    /// Every completed capture of group `index` along the match, in order.
    /// Only recorded for patterns compiled with `Options::CAPTURE_HISTORY`.
    pub fn history(&self, index: usize) -> Option<Vec<Match<'s>>> {
        let spans = self.region.history(index)?;
        Some(spans.iter().map(|&span| Match::new(self.subject, span)).collect())
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn into_region(self) -> Region {
        self.region
    }
}
