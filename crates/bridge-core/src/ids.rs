//! API-request-id sequencer (spec.md §4.1, §8).
//!
//! Counter starts at 0, increments before return, wraps to 1 (not 0) when it
//! reaches 32768. Not required to be monotonic across restarts.

use std::sync::atomic::{AtomicU32, Ordering};

pub struct ApiRequestIdSequencer {
    next: AtomicU32,
}

impl ApiRequestIdSequencer {
    pub fn new() -> Self {
        Self {
            next: AtomicU32::new(0),
        }
    }

    /// Allocate the next request id.
    pub fn next(&self) -> u16 {
        loop {
            let current = self.next.load(Ordering::Relaxed);
            let advanced = if current + 1 >= 32_768 { 1 } else { current + 1 };
            if self
                .next
                .compare_exchange(current, advanced, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                return advanced as u16;
            }
        }
    }
}

impl Default for ApiRequestIdSequencer {
    fn default() -> Self {
        Self::new()
    }
}
