//! Fixed-capacity, overwrite-oldest ring buffer with zero-copy snapshots.
//!
//! This crate provides [`Ring`], a single-producer/single-consumer ring of
//! fixed-size elements over caller-provided storage, for environments where
//! allocation after start-up is not allowed and the writer must never wait
//! for the reader.
//!
//! # Overview
//!
//! - **Admission**: [`Ring::write`] always accepts every element. If the
//!   ring is full, the oldest unread elements are dropped to make room.
//! - **Snapshots**: [`Ring::snapshot`] captures the readable range. A
//!   [`Snapshot`] walks it without consuming anything, handing out `&[u8]`
//!   spans that point straight into storage.
//! - **Commit**: the consumer decides afterwards how much it processed, by
//!   count ([`Ring::commit`]) or by handing back the address of the last
//!   element it used ([`Ring::commit_to`]).
//!
//! The ring itself contains no synchronization. For use across contexts,
//! [`sync::SharedRing`] wraps it in a spin lock.
//!
//! # Capacity
//!
//! The capacity must be a power of two; positions are mapped to slots by
//! masking. This is asserted in debug builds only.
//!
//! # Examples
//!
//! Parsing newline-terminated records without copying:
//!
//! ```
//! use tidal_ring::Ring;
//!
//! let mut ring = Ring::new([0u8; 16], 16, 1);
//! ring.write(b"temp=21\nhum");
//!
//! let mut snap = ring.snapshot();
//! let span = snap.next_span(&ring).unwrap();
//! let nl = span.iter().position(|&b| b == b'\n').unwrap();
//! assert_eq!(&span[..nl], b"temp=21");
//!
//! // Consume the record including its delimiter; "hum" stays unread.
//! let delim: *const u8 = &span[nl];
//! assert_eq!(ring.commit_to(delim), Ok(8));
//! assert_eq!(ring.available(), 3);
//! ```
//!
//! # Features
//!
//! - `log` (default): emits trace/debug messages through `tidal-log` when
//!   data is evicted or the ring is reset.

#![cfg_attr(not(test), no_std)]

/// Trace-level message through `tidal-log`, compiled out without `log`.
macro_rules! ring_trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log")]
        tidal_log::ktrace!($($arg)*);
    }};
}

/// Debug-level message through `tidal-log`, compiled out without `log`.
macro_rules! ring_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log")]
        tidal_log::kdebug!($($arg)*);
    }};
}

pub(crate) use ring_debug;
pub(crate) use ring_trace;

mod ring;
mod slot;
mod snapshot;
pub mod sync;

pub use ring::Ring;
pub use slot::ResolveError;
pub use snapshot::{Elements, Snapshot, Spans};
