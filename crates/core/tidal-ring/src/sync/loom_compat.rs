//! Loom compatibility shim.
//!
//! When compiled with `cfg(loom)`, re-exports loom's atomics and
//! `UnsafeCell`, and yields to the loom scheduler while spinning. Otherwise,
//! re-exports the `core` types.

// ---------------------------------------------------------------------------
// Loom mode
// ---------------------------------------------------------------------------

#[cfg(loom)]
pub(crate) use loom::cell::{MutPtr, UnsafeCell};
#[cfg(loom)]
pub(crate) use loom::sync::atomic::{AtomicBool, Ordering};

#[cfg(loom)]
#[inline]
pub(crate) fn spin_hint() {
    loom::thread::yield_now();
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

#[cfg(not(loom))]
pub(crate) use core::cell::UnsafeCell;
#[cfg(not(loom))]
pub(crate) use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(not(loom))]
#[inline]
pub(crate) fn spin_hint() {
    core::hint::spin_loop();
}
