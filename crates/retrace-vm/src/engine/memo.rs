//! Explosion memo.
//!
//! One bit per (guard site, position): set once every continuation from
//! that site at that position has failed. Reaching a marked pair again
//! fails immediately, which turns nested-quantifier blow-ups polynomial.

use bitvec::vec::BitVec;
use retrace_bytecode::StateCheckId;

/// Largest memo, in bits, a search is willing to allocate.
const MAX_BITS: usize = 1 << 28;

#[derive(Debug)]
pub(crate) struct StateMemo {
    bits: BitVec,
    /// Positions per site: subject length plus one.
    width: usize,
}

impl StateMemo {
    /// A cleared memo, or `None` when it would be too large to be worth it.
    pub(crate) fn new(sites: u32, subject_len: usize) -> Option<Self> {
        let width = subject_len.checked_add(1)?;
        let size = width.checked_mul(sites as usize)?;
        if sites == 0 || size > MAX_BITS {
            return None;
        }
        Some(Self {
            bits: BitVec::repeat(false, size),
            width,
        })
    }

    #[inline]
    fn index(&self, id: StateCheckId, pos: usize) -> usize {
        id as usize * self.width + pos
    }

    #[inline]
    pub(crate) fn is_failed(&self, id: StateCheckId, pos: usize) -> bool {
        self.bits[self.index(id, pos)]
    }

    #[inline]
    pub(crate) fn mark_failed(&mut self, id: StateCheckId, pos: usize) {
        let index = self.index(id, pos);
        self.bits.set(index, true);
    }
}
