//! A [`Ring`] shared between a producer and a consumer context.

#[cfg(loom)]
use core::mem::ManuallyDrop;
use core::ops::{Deref, DerefMut};

#[cfg(loom)]
use super::loom_compat::MutPtr;
use super::loom_compat::{AtomicBool, Ordering, UnsafeCell, spin_hint};
use crate::ring::Ring;
use crate::slot::ResolveError;

/// A [`Ring`] behind a spin lock.
///
/// Every method takes `&self` and holds the lock for one ring operation, so
/// a producer and a consumer can share the ring by reference (e.g. through
/// a `static` or an `Arc`). Overwrite-oldest eviction moves the read
/// counter from the producer side; the lock keeps that update and the
/// consumer's commits from interleaving.
pub struct SharedRing<S> {
    locked: AtomicBool,
    ring: UnsafeCell<Ring<S>>,
}

// SAFETY: The ring is only reached through `RingGuard`, which holds the lock.
// `S: Send` because the storage is touched from whichever context holds it.
unsafe impl<S: Send> Send for SharedRing<S> {}
unsafe impl<S: Send> Sync for SharedRing<S> {}

impl<S> SharedRing<S> {
    /// Wraps an existing ring.
    pub fn new(ring: Ring<S>) -> Self {
        Self {
            locked: AtomicBool::new(false),
            ring: UnsafeCell::new(ring),
        }
    }

    /// Locks the ring for a sequence of operations, spinning until free.
    pub fn lock(&self) -> RingGuard<'_, S> {
        loop {
            if self
                .locked
                .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                return RingGuard::new(self);
            }

            // TTAS: wait on plain loads so the cache line stays shared.
            while self.locked.load(Ordering::Relaxed) {
                spin_hint();
            }
        }
    }

    /// Locks the ring if nobody else holds it.
    pub fn try_lock(&self) -> Option<RingGuard<'_, S>> {
        if self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            Some(RingGuard::new(self))
        } else {
            None
        }
    }

    /// Direct access; `&mut self` proves nobody else holds the lock.
    #[cfg(not(loom))]
    pub fn get_mut(&mut self) -> &mut Ring<S> {
        self.ring.get_mut()
    }

    /// Direct access; `&mut self` proves nobody else holds the lock.
    #[cfg(loom)]
    pub fn get_mut(&mut self) -> &mut Ring<S> {
        // SAFETY: `&mut self` rules out any live guard.
        self.ring.with_mut(|ring| unsafe { &mut *ring })
    }

    /// Unwraps the ring.
    pub fn into_inner(self) -> Ring<S> {
        self.ring.into_inner()
    }
}

impl<S: AsRef<[u8]>> SharedRing<S> {
    /// Number of readable elements at this instant.
    pub fn available(&self) -> usize {
        self.lock().available()
    }

    /// Runs `f` with the ring locked. Snapshots and spans taken inside the
    /// closure cannot escape it.
    pub fn read<R>(&self, f: impl FnOnce(&Ring<S>) -> R) -> R {
        f(&self.lock())
    }

    /// Copies as many whole readable elements as fit into `dst`, oldest
    /// first, without consuming them. Returns the element count copied.
    pub fn peek_into(&self, dst: &mut [u8]) -> usize {
        let ring = self.lock();
        let es = ring.elem_size();
        let room = dst.len() / es * es;

        let mut copied = 0;
        for span in ring.spans() {
            let take = span.len().min(room - copied);
            dst[copied..copied + take].copy_from_slice(&span[..take]);
            copied += take;
            if copied == room {
                break;
            }
        }
        copied / es
    }

    /// See [`Ring::commit`].
    pub fn commit(&self, n: usize) -> usize {
        self.lock().commit(n)
    }

    /// See [`Ring::commit_to`].
    ///
    /// # Errors
    ///
    /// Same as [`Ring::commit_to`].
    pub fn commit_to(&self, elem: *const u8) -> Result<usize, ResolveError> {
        self.lock().commit_to(elem)
    }

    /// See [`Ring::reset`].
    pub fn reset(&self) {
        self.lock().reset();
    }
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> SharedRing<S> {
    /// See [`Ring::write`].
    pub fn write(&self, elems: &[u8]) -> usize {
        self.lock().write(elems)
    }

    /// See [`Ring::push`].
    pub fn push(&self, elem: &[u8]) {
        self.lock().push(elem);
    }
}

/// Exclusive access to a [`SharedRing`]; unlocks on drop.
pub struct RingGuard<'a, S> {
    shared: &'a SharedRing<S>,
    /// Tracked access to the cell, released before the unlock.
    #[cfg(loom)]
    access: ManuallyDrop<MutPtr<Ring<S>>>,
}

impl<'a, S> RingGuard<'a, S> {
    /// Caller must hold the lock.
    fn new(shared: &'a SharedRing<S>) -> Self {
        Self {
            shared,
            #[cfg(loom)]
            access: ManuallyDrop::new(shared.ring.get_mut()),
        }
    }
}

impl<S> Deref for RingGuard<'_, S> {
    type Target = Ring<S>;

    #[cfg(not(loom))]
    fn deref(&self) -> &Ring<S> {
        // SAFETY: The guard exists only while the lock is held.
        unsafe { &*self.shared.ring.get() }
    }

    #[cfg(loom)]
    fn deref(&self) -> &Ring<S> {
        // SAFETY: The guard exists only while the lock is held.
        unsafe { MutPtr::deref(&self.access) }
    }
}

impl<S> DerefMut for RingGuard<'_, S> {
    #[cfg(not(loom))]
    fn deref_mut(&mut self) -> &mut Ring<S> {
        // SAFETY: The guard exists only while the lock is held.
        unsafe { &mut *self.shared.ring.get() }
    }

    #[cfg(loom)]
    fn deref_mut(&mut self) -> &mut Ring<S> {
        // SAFETY: The guard exists only while the lock is held.
        unsafe { MutPtr::deref(&self.access) }
    }
}

impl<S> Drop for RingGuard<'_, S> {
    fn drop(&mut self) {
        // SAFETY: `access` is never used again.
        #[cfg(loom)]
        unsafe {
            ManuallyDrop::drop(&mut self.access);
        }
        self.shared.locked.store(false, Ordering::Release);
    }
}
