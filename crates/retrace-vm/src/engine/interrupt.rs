//! Cross-thread cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Handle that cancels in-flight searches.
///
/// Clones share one flag. A search polls it every
/// [`MatchLimits::interrupt_interval`](super::MatchLimits::interrupt_interval)
/// steps and stops with [`SearchOutcome::Interrupted`](super::SearchOutcome::Interrupted).
/// The flag stays set until [`Interrupt::reset`] is called.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
