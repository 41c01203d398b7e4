//! Suspending the page scroll behind an open lightbox.
//!
//! [`ScrollLockGuard`] suspends on creation and restores on drop, so the page
//! gets its scrolling back exactly once however the lightbox goes away.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

/// Something that can stop and restart scrolling of the page.
pub trait ScrollLock {
    fn suspend(&self);
    fn restore(&self);
}

pub type SharedScrollLock = Arc<dyn ScrollLock + Send + Sync>;

/// Holds the page scroll suspended for its lifetime.
pub struct ScrollLockGuard {
    lock: SharedScrollLock,
}

impl ScrollLockGuard {
    pub fn acquire(lock: SharedScrollLock) -> Self {
        lock.suspend();
        Self { lock }
    }
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        self.lock.restore();
    }
}

impl std::fmt::Debug for ScrollLockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ScrollLockGuard")
    }
}

/// Scroll lock for the gallery page.
///
/// The gallery's scroll area reads [`PageScroll::is_locked`] every frame.
#[derive(Debug, Default)]
pub struct PageScroll {
    locked: AtomicBool,
}

impl PageScroll {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }
}

impl ScrollLock for PageScroll {
    fn suspend(&self) {
        if self.locked.swap(true, Ordering::AcqRel) {
            warn!("page scroll suspended twice");
        }
    }

    fn restore(&self) {
        self.locked.store(false, Ordering::Release);
    }
}

/// A lock that does nothing, for hosts without a scrolling page.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoScrollLock;

impl ScrollLock for NoScrollLock {
    fn suspend(&self) {}
    fn restore(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_locks_until_dropped() {
        let page = PageScroll::new();
        {
            let _guard = ScrollLockGuard::acquire(page.clone());
            assert!(page.is_locked());
        }
        assert!(!page.is_locked());
    }

    #[test]
    fn guard_restores_during_unwind() {
        let page = PageScroll::new();
        let lock = page.clone();
        let result = std::panic::catch_unwind(move || {
            let _guard = ScrollLockGuard::acquire(lock);
            panic!("lightbox torn down");
        });
        assert!(result.is_err());
        assert!(!page.is_locked());
    }
}
