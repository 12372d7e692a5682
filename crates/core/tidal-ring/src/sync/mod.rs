//! Optional locking around a [`Ring`](crate::Ring).
//!
//! The ring engine carries no synchronization of its own: it assumes one
//! producer and one consumer that never run at the same time. When the two
//! sides live in different threads or interrupt contexts, [`SharedRing`]
//! serializes every counter update behind a test-and-test-and-set spin
//! lock. The lock is held only for the duration of one operation; consumers
//! that want to process data outside the critical section copy it out with
//! [`SharedRing::peek_into`] and commit afterwards.

mod loom_compat;
mod shared;

pub use shared::{RingGuard, SharedRing};
