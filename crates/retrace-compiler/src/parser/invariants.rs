//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use super::core::Parser;

impl Parser<'_> {
    #[inline]
    pub(super) fn assert_consumed(&self) {
        assert!(
            self.eof(),
            "broken parser invariant: stopped at offset {} of {} without an error",
            self.pos,
            self.pattern.len(),
        );
    }
}
