//! Debug-only check that the chain is never observed while it is being
//! relinked.
//!
//! The only user code the map runs mid-operation is `K: Hash` and `K: Eq`.
//! If either reaches back into the same map (through a raw pointer or
//! interior mutability) during an insert, erase, rehash or clear, it would
//! see half-linked runs. Read-only scans may nest freely; starting any scan
//! while a relink is in progress panics in debug builds. Release builds
//! carry a zero-sized no-op.

use core::cell::Cell;
use core::marker::PhantomData;

#[derive(Debug)]
pub(crate) struct WalkGuard {
    #[cfg(debug_assertions)]
    relinking: Cell<bool>,
    // Single-threaded map: keep the owner !Send + !Sync.
    _single_thread: PhantomData<*mut ()>,
}

impl WalkGuard {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            relinking: Cell::new(false),
            _single_thread: PhantomData,
        }
    }

    /// Called before a read-only run scan.
    #[inline]
    pub(crate) fn check_read(&self) {
        #[cfg(debug_assertions)]
        assert!(
            !self.relinking.get(),
            "reentrancy detected: map read while its chain is being relinked"
        );
    }

    /// Open a relinking section; it closes when the returned value drops.
    #[inline]
    pub(crate) fn relink(&self) -> Relinking<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.relinking.replace(true),
                "reentrancy detected: map modified while its chain is being relinked"
            );
            return Relinking { guard: self };
        }

        #[cfg(not(debug_assertions))]
        {
            return Relinking { _lt: PhantomData };
        }
    }
}

impl Default for WalkGuard {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct Relinking<'a> {
    #[cfg(debug_assertions)]
    guard: &'a WalkGuard,
    #[cfg(not(debug_assertions))]
    _lt: PhantomData<&'a ()>,
}

impl Drop for Relinking<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.guard.relinking.set(false);
    }
}
