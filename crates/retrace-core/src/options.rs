//! Compile-time and search-time option sets.

use bitflags::bitflags;

bitflags! {
    /// Options fixed when a pattern is compiled.
    ///
    /// `IGNORECASE`, `EXTEND`, `MULTILINE` and `SINGLELINE` can also be
    /// toggled inside the pattern with `(?imx-imx)`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Options: u32 {
        const IGNORECASE         = 1 << 0;
        /// Whitespace and `#` comments in the pattern are ignored.
        const EXTEND             = 1 << 1;
        /// `.` also matches a newline.
        const MULTILINE          = 1 << 2;
        /// `^` matches only at the start and `$` only at the end.
        const SINGLELINE         = 1 << 3;
        const FIND_LONGEST       = 1 << 4;
        const FIND_NOT_EMPTY     = 1 << 5;
        /// Clears a `SINGLELINE` coming from the dialect's defaults.
        const NEGATE_SINGLE_LINE = 1 << 6;
        /// Plain `(...)` groups do not capture.
        const DONT_CAPTURE_GROUP = 1 << 7;
        /// Plain `(...)` groups capture even when named groups exist.
        const CAPTURE_GROUP      = 1 << 8;
        /// Keep every completed span of every group along the match path.
        const CAPTURE_HISTORY    = 1 << 9;
        const WORD_IS_ASCII      = 1 << 10;
        const DIGIT_IS_ASCII     = 1 << 11;
        const SPACE_IS_ASCII     = 1 << 12;
        const POSIX_IS_ASCII     = 1 << 13;
    }
}

bitflags! {
    /// Options applied to a single search call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SearchOptions: u32 {
        /// The subject start is not a beginning of line (nor of buffer).
        const NOTBOL         = 1 << 0;
        /// The subject end is not an end of line (nor of buffer).
        const NOTEOL         = 1 << 1;
        const FIND_LONGEST   = 1 << 2;
        const FIND_NOT_EMPTY = 1 << 3;
    }
}

impl Options {
    /// Options the pattern itself may flip with an inline `(?...)` group.
    pub const INLINE: Self = Self::IGNORECASE
        .union(Self::EXTEND)
        .union(Self::MULTILINE)
        .union(Self::SINGLELINE);

    /// Search-time options implied by compile-time ones.
    pub fn search_defaults(self) -> SearchOptions {
        let mut out = SearchOptions::empty();
        out.set(SearchOptions::FIND_LONGEST, self.contains(Self::FIND_LONGEST));
        out.set(SearchOptions::FIND_NOT_EMPTY, self.contains(Self::FIND_NOT_EMPTY));
        out
    }
}
