//! Translation between element pointers and physical ring slots.
//!
//! Spans handed out by the ring are plain `&[u8]` views into its storage. A
//! consumer that scans a span and stops on some element can hand that
//! element's address back to the ring; these helpers turn the address into a
//! slot index without ever dereferencing it.

use core::fmt;

/// Failure to resolve an element pointer back to a ring position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    /// The pointer does not lie inside the ring's storage region.
    OutOfBounds,
    /// The pointer lies inside storage but not on an element boundary.
    Misaligned,
    /// The slot is valid but outside the readable range being resolved
    /// against (a snapshot, or the live `[tail, head)` window).
    NotInRange,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds => f.write_str("pointer outside ring storage"),
            Self::Misaligned => f.write_str("pointer not on an element boundary"),
            Self::NotInRange => f.write_str("pointer outside the readable range"),
        }
    }
}

impl core::error::Error for ResolveError {}

/// Returns the physical slot addressed by `elem` within `region`.
///
/// `region` must be exactly the `capacity * elem_size` bytes the ring
/// indexes; trailing storage beyond it is rejected as out of bounds.
pub(crate) fn slot_of(
    region: &[u8],
    elem_size: usize,
    elem: *const u8,
) -> Result<usize, ResolveError> {
    let offset = elem
        .addr()
        .checked_sub(region.as_ptr().addr())
        .ok_or(ResolveError::OutOfBounds)?;
    if offset >= region.len() {
        return Err(ResolveError::OutOfBounds);
    }
    if offset % elem_size != 0 {
        return Err(ResolveError::Misaligned);
    }
    Ok(offset / elem_size)
}

/// Forward distance from `start` to `slot` walking the ring, `mask = capacity - 1`.
#[inline]
pub(crate) const fn distance_forward(slot: usize, start: usize, mask: usize) -> usize {
    slot.wrapping_sub(start) & mask
}
