//! Character class payload.

use std::fmt;

use bitvec::array::BitArray;
use bitvec::order::Lsb0;
use retrace_core::{CodePoint, CodeRange};

/// 256-bit set, one bit per byte value.
pub type ByteMap = BitArray<[u64; 4], Lsb0>;

/// A set of code points: a bitmap below 256 and sorted ranges above.
#[derive(Clone, PartialEq, Eq)]
pub struct CharClass {
    low: ByteMap,
    high: Box<[CodeRange]>,
    negated: bool,
}

impl CharClass {
    /// Builds a class from sorted, non-overlapping inclusive ranges.
    pub fn from_ranges(ranges: &[CodeRange], negated: bool) -> Self {
        let mut low = ByteMap::ZERO;
        let mut high = Vec::new();
        for &(lo, hi) in ranges {
            if lo < 256 {
                for code in lo..=hi.min(255) {
                    low.set(code as usize, true);
                }
            }
            if hi >= 256 {
                high.push((lo.max(256), hi));
            }
        }
        Self {
            low,
            high: high.into_boxed_slice(),
            negated,
        }
    }

    #[inline]
    pub fn matches(&self, code: CodePoint) -> bool {
        let hit = if code < 256 {
            self.low[code as usize]
        } else {
            self.high
                .binary_search_by(|&(lo, hi)| {
                    if hi < code {
                        std::cmp::Ordering::Less
                    } else if lo > code {
                        std::cmp::Ordering::Greater
                    } else {
                        std::cmp::Ordering::Equal
                    }
                })
                .is_ok()
        };
        hit != self.negated
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Whether some code point at or above 256 may match.
    pub fn has_high(&self) -> bool {
        self.negated || !self.high.is_empty()
    }

    /// Byte values that may start a match under a single-byte view of the class.
    pub fn low_map(&self) -> ByteMap {
        if self.negated { !self.low } else { self.low }
    }

    /// Inclusive ranges of the (non-negated) set, for dumps.
    pub fn ranges(&self) -> Vec<CodeRange> {
        let mut out: Vec<CodeRange> = Vec::new();
        for code in self.low.iter_ones() {
            let code = code as CodePoint;
            match out.last_mut() {
                Some((_, hi)) if *hi + 1 == code => *hi = code,
                _ => out.push((code, code)),
            }
        }
        out.extend(self.high.iter().copied());
        out
    }
}

impl fmt::Debug for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        if self.negated {
            f.write_str("^")?;
        }
        for (lo, hi) in self.ranges() {
            write_code(f, lo)?;
            if hi > lo {
                f.write_str("-")?;
                write_code(f, hi)?;
            }
        }
        f.write_str("]")
    }
}

fn write_code(f: &mut fmt::Formatter<'_>, code: CodePoint) -> fmt::Result {
    match char::from_u32(code) {
        Some(c) if c.is_ascii_graphic() && !matches!(c, '[' | ']' | '-' | '^' | '\\') => {
            write!(f, "{c}")
        }
        _ => write!(f, "\\x{{{code:x}}}"),
    }
}
