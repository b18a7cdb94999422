//! Code point sets as sorted inclusive ranges.

use retrace_core::{CodePoint, CodeRange};

/// A set under construction. Ranges may overlap until [`ClassSet::normalize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassSet {
    ranges: Vec<CodeRange>,
}

impl ClassSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ranges(ranges: &[CodeRange]) -> Self {
        let mut set = Self {
            ranges: ranges.to_vec(),
        };
        set.normalize();
        set
    }

    pub fn add(&mut self, code: CodePoint) {
        self.ranges.push((code, code));
    }

    pub fn add_range(&mut self, lo: CodePoint, hi: CodePoint) {
        if lo <= hi {
            self.ranges.push((lo, hi));
        }
    }

    pub fn add_set(&mut self, other: &ClassSet) {
        self.ranges.extend_from_slice(&other.ranges);
    }

    pub fn contains(&self, code: CodePoint) -> bool {
        self.ranges.iter().any(|&(lo, hi)| lo <= code && code <= hi)
    }

    /// Sorts and merges overlapping or adjacent ranges.
    pub fn normalize(&mut self) {
        self.ranges.sort_unstable();
        let mut out: Vec<CodeRange> = Vec::with_capacity(self.ranges.len());
        for &(lo, hi) in &self.ranges {
            match out.last_mut() {
                Some((_, last_hi)) if lo <= last_hi.saturating_add(1) => {
                    *last_hi = (*last_hi).max(hi);
                }
                _ => out.push((lo, hi)),
            }
        }
        self.ranges = out;
    }

    /// Everything in `0..=max_code` not in the set.
    pub fn complement(&self, max_code: CodePoint) -> ClassSet {
        let mut sorted = self.clone();
        sorted.normalize();
        let mut out = Vec::new();
        let mut next = 0u64;
        for &(lo, hi) in &sorted.ranges {
            if lo > max_code {
                break;
            }
            if u64::from(lo) > next {
                out.push((next as CodePoint, lo - 1));
            }
            next = next.max(u64::from(hi) + 1);
        }
        if next <= u64::from(max_code) {
            out.push((next as CodePoint, max_code));
        }
        ClassSet { ranges: out }
    }

    pub fn intersect(&self, other: &ClassSet) -> ClassSet {
        let mut a = self.clone();
        let mut b = other.clone();
        a.normalize();
        b.normalize();
        let (mut i, mut j) = (0, 0);
        let mut out = Vec::new();
        while i < a.ranges.len() && j < b.ranges.len() {
            let (alo, ahi) = a.ranges[i];
            let (blo, bhi) = b.ranges[j];
            let lo = alo.max(blo);
            let hi = ahi.min(bhi);
            if lo <= hi {
                out.push((lo, hi));
            }
            if ahi < bhi {
                i += 1;
            } else {
                j += 1;
            }
        }
        ClassSet { ranges: out }
    }

    /// Drops everything above `max_code`.
    pub fn clamp(&mut self, max_code: CodePoint) {
        self.ranges.retain(|&(lo, _)| lo <= max_code);
        for range in &mut self.ranges {
            range.1 = range.1.min(max_code);
        }
    }

    pub fn into_ranges(mut self) -> Vec<CodeRange> {
        self.normalize();
        self.ranges
    }
}
