//! "Drop if busy" flags.
//!
//! Sort, filter and load are guarded by a flag that makes a second call
//! arriving while the first is still running a silent no-op. Calls are never
//! queued.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A shared busy flag.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to mark the flag busy.
    ///
    /// Returns `None` if it already is. The flag is released when the
    /// returned guard is dropped.
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(Arc::clone(&self.0)))
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Releases its [`BusyFlag`] on drop.
#[derive(Debug)]
pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_refused_until_release() {
        let flag = BusyFlag::new();
        let guard = flag.try_acquire();
        assert!(guard.is_some());
        assert!(flag.is_busy());
        assert!(flag.clone().try_acquire().is_none());
        drop(guard);
        assert!(!flag.is_busy());
        assert!(flag.try_acquire().is_some());
    }
}
