//! The ring itself: admission and commit.
//!
//! [`Ring`] indexes caller-provided storage with two free-running counters,
//! `head` (next write position) and `tail` (next read position). Neither
//! counter is ever wrapped to the capacity; the physical slot of a logical
//! position `p` is `p & (capacity - 1)`, which is why the capacity must be a
//! power of two. Counters advance with wrapping arithmetic, so overflowing
//! `usize` does not disturb the masking.
//!
//! # Admission policy
//!
//! Writes never fail and never block. When a write needs more room than is
//! free, `tail` is pushed forward and the oldest unread elements are
//! silently dropped (overwrite-oldest).
//!
//! # Commit
//!
//! Reading happens through a [`Snapshot`], which does not consume anything.
//! The consumer decides afterwards how much it actually processed and calls
//! [`Ring::commit`] or [`Ring::commit_to`].

use core::fmt;

use crate::slot::{self, ResolveError};
use crate::snapshot::{Snapshot, Spans};

/// A fixed-capacity, overwrite-oldest ring of fixed-size elements.
///
/// `S` is the backing storage: an owned array (`[u8; N]`), a borrowed slice
/// (`&mut [u8]`), or anything else exposing bytes. The ring never allocates
/// and never frees the storage.
///
/// # Examples
///
/// ```
/// use tidal_ring::Ring;
///
/// let mut ring = Ring::new([0u8; 4], 4, 1);
/// ring.write(&[1, 2, 3]);
/// ring.write(&[4, 5]); // drops `1`
/// assert_eq!(ring.available(), 4);
///
/// let bytes: Vec<u8> = ring.spans().flatten().copied().collect();
/// assert_eq!(bytes, [2, 3, 4, 5]);
///
/// ring.commit(2);
/// assert_eq!(ring.available(), 2);
/// ```
pub struct Ring<S> {
    storage: S,
    capacity: usize,
    mask: usize,
    elem_size: usize,
    /// Next write position (monotonic).
    head: usize,
    /// Next read position (monotonic).
    tail: usize,
}

impl<S> fmt::Debug for Ring<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ring")
            .field("capacity", &self.capacity)
            .field("elem_size", &self.elem_size)
            .field("head", &self.head)
            .field("tail", &self.tail)
            .finish_non_exhaustive()
    }
}

impl<S: AsRef<[u8]>> Ring<S> {
    /// Binds a ring to `storage` with room for `capacity` elements of
    /// `elem_size` bytes each. Both counters start at zero.
    ///
    /// `capacity` must be a power of two, `elem_size` at least one, and
    /// `storage` at least `capacity * elem_size` bytes long. These are
    /// checked in debug builds only; in release builds a non-power-of-two
    /// capacity silently produces wrong wraparound.
    pub fn new(storage: S, capacity: usize, elem_size: usize) -> Self {
        debug_assert!(
            capacity.is_power_of_two(),
            "ring capacity {capacity} is not a power of two"
        );
        debug_assert!(elem_size >= 1, "ring element size must be non-zero");
        debug_assert!(
            storage.as_ref().len() >= capacity * elem_size,
            "ring storage holds {} bytes, need {}",
            storage.as_ref().len(),
            capacity * elem_size
        );

        Self {
            storage,
            capacity,
            mask: capacity.wrapping_sub(1),
            elem_size,
            head: 0,
            tail: 0,
        }
    }

    /// Empties the ring without touching storage.
    ///
    /// Outstanding snapshots keep their captured counters; resolving
    /// pointers against them after a reset fails or addresses stale data.
    pub fn reset(&mut self) {
        self.head = 0;
        self.tail = 0;
        crate::ring_debug!("ring: reset ({} slots)", self.capacity);
    }

    /// Capacity in elements.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Size of one element in bytes.
    #[must_use]
    pub const fn elem_size(&self) -> usize {
        self.elem_size
    }

    /// Number of elements between `tail` and `head`.
    #[must_use]
    pub const fn available(&self) -> usize {
        self.head.wrapping_sub(self.tail)
    }

    /// Number of elements that can be written before the oldest is dropped.
    #[must_use]
    pub const fn free(&self) -> usize {
        self.capacity.saturating_sub(self.available())
    }

    /// Returns `true` if no element is readable.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Returns `true` if the next write will drop data.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.available() >= self.capacity
    }

    /// Logical write counter.
    #[must_use]
    pub const fn head(&self) -> usize {
        self.head
    }

    /// Logical read counter.
    #[must_use]
    pub const fn tail(&self) -> usize {
        self.tail
    }

    /// The backing storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Releases the backing storage.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Captures the readable range `[tail, head)` as it is right now.
    #[must_use]
    pub const fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.tail, self.head)
    }

    /// Iterates the current contents as at most two contiguous spans.
    pub fn spans(&self) -> Spans<'_, S> {
        self.snapshot().spans(self)
    }

    /// Consumes up to `n` elements from the tail and returns how many were
    /// actually consumed. Never moves `tail` past `head`.
    pub fn commit(&mut self, n: usize) -> usize {
        let n = n.min(self.available());
        self.tail = self.tail.wrapping_add(n);
        n
    }

    /// Consumes everything up to and including the element at `elem`.
    ///
    /// `elem` must point at the first byte of an element inside the live
    /// range `[tail, head)`, typically taken from a span returned by a
    /// snapshot. Returns the number of elements consumed.
    ///
    /// # Errors
    ///
    /// Fails without changing state if `elem` lies outside storage, is not
    /// on an element boundary, or addresses a slot outside `[tail, head)`.
    pub fn commit_to(&mut self, elem: *const u8) -> Result<usize, ResolveError> {
        let dist = self.resolve(elem, self.tail, self.available())?;
        self.tail = self.tail.wrapping_add(dist + 1);
        Ok(dist + 1)
    }

    /// Resolves `elem` to its distance from logical position `from`,
    /// requiring it to lie within the next `len` elements.
    pub(crate) fn resolve(
        &self,
        elem: *const u8,
        from: usize,
        len: usize,
    ) -> Result<usize, ResolveError> {
        let slot = slot::slot_of(self.region(), self.elem_size, elem)?;
        let dist = slot::distance_forward(slot, from & self.mask, self.mask);
        if dist >= len {
            return Err(ResolveError::NotInRange);
        }
        Ok(dist)
    }

    /// Longest contiguous run starting at logical position `pos`, capped at
    /// `max` elements and at the physical end of storage.
    pub(crate) fn contiguous(&self, pos: usize, max: usize) -> &[u8] {
        let start = pos & self.mask;
        let count = max.min(self.capacity - start);
        let es = self.elem_size;
        &self.region()[start * es..(start + count) * es]
    }

    /// The `capacity * elem_size` bytes the ring indexes.
    fn region(&self) -> &[u8] {
        &self.storage.as_ref()[..self.capacity * self.elem_size]
    }
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> Ring<S> {
    /// Appends every element in `elems` and returns the element count.
    ///
    /// Trailing bytes that do not fill a whole element are ignored. If
    /// there is not enough free room the oldest unread elements are
    /// dropped; when more than `capacity` elements are written at once,
    /// only the newest `capacity` of them remain readable.
    pub fn write(&mut self, elems: &[u8]) -> usize {
        let es = self.elem_size;
        let n = elems.len() / es;
        if n == 0 {
            return 0;
        }
        let elems = &elems[..n * es];

        let free = self.free();
        if n > free {
            let evicted = n - free;
            self.tail = self.tail.wrapping_add(evicted);
            crate::ring_trace!("ring: overwrite-oldest dropped {evicted} elements");
        }

        let keep = n.min(self.capacity);
        let skip = n - keep;
        self.write_at(self.head.wrapping_add(skip), &elems[skip * es..]);
        self.head = self.head.wrapping_add(n);
        n
    }

    /// Appends a single element.
    pub fn push(&mut self, elem: &[u8]) {
        debug_assert_eq!(elem.len(), self.elem_size, "push of a partial element");
        self.write(elem);
    }

    /// Copies whole elements to logical position `pos`, splitting at the
    /// physical end of storage. `src` holds at most `capacity` elements.
    fn write_at(&mut self, pos: usize, src: &[u8]) {
        let es = self.elem_size;
        let start = pos & self.mask;
        let first = (self.capacity - start) * es;
        let region = &mut self.storage.as_mut()[..self.capacity * es];

        if src.len() <= first {
            region[start * es..start * es + src.len()].copy_from_slice(src);
        } else {
            let (before_wrap, after_wrap) = src.split_at(first);
            region[start * es..].copy_from_slice(before_wrap);
            region[..after_wrap.len()].copy_from_slice(after_wrap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents<S: AsRef<[u8]>>(ring: &Ring<S>) -> Vec<u8> {
        ring.spans().flatten().copied().collect()
    }

    #[test]
    fn new_ring_is_empty() {
        let ring = Ring::new([0u8; 8], 8, 1);
        assert!(ring.is_empty());
        assert!(!ring.is_full());
        assert_eq!(ring.available(), 0);
        assert_eq!(ring.free(), 8);
        assert_eq!(ring.capacity(), 8);
        assert_eq!(ring.elem_size(), 1);
    }

    #[test]
    fn write_without_overflow_keeps_tail() {
        let mut ring = Ring::new([0u8; 8], 8, 1);
        assert_eq!(ring.write(&[1, 2, 3]), 3);
        assert_eq!(ring.write(&[4, 5]), 2);
        assert_eq!(ring.tail(), 0);
        assert_eq!(ring.head(), 5);
        assert_eq!(contents(&ring), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn empty_write_is_a_no_op() {
        let mut ring = Ring::new([0u8; 4], 4, 1);
        assert_eq!(ring.write(&[]), 0);
        assert_eq!(ring.head(), 0);
    }

    #[test]
    fn overwrite_oldest() {
        let mut ring = Ring::new([0u8; 4], 4, 1);
        ring.write(&[1, 2, 3]);
        assert_eq!(ring.available(), 3);
        ring.write(&[4, 5]);
        assert_eq!(ring.available(), 4);
        assert_eq!(ring.tail(), 1);
        assert!(ring.is_full());
        assert_eq!(contents(&ring), [2, 3, 4, 5]);

        assert_eq!(ring.commit(2), 2);
        assert_eq!(ring.available(), 2);
        assert_eq!(contents(&ring), [4, 5]);
    }

    #[test]
    fn trailing_partial_element_is_ignored() {
        let mut ring = Ring::new([0u8; 8], 4, 2);
        ring.write(&[9, 9, 1, 1, 2, 2, 3, 3]);
        ring.commit(1);

        // Ends on the slot just before the tail; the stray byte must not
        // spill onto the oldest unread element.
        assert_eq!(ring.write(&[4, 4, 0xEE]), 1);
        assert_eq!(ring.head(), 5);
        assert_eq!(ring.tail(), 1);
        assert_eq!(contents(&ring), [1, 1, 2, 2, 3, 3, 4, 4]);

        assert_eq!(ring.write(&[0xEE]), 0);
        assert_eq!(ring.head(), 5);
        assert_eq!(contents(&ring), [1, 1, 2, 2, 3, 3, 4, 4]);
    }

    #[test]
    fn write_larger_than_capacity_keeps_newest() {
        let mut ring = Ring::new([0u8; 4], 4, 1);
        ring.write(&[9]);
        assert_eq!(ring.write(&[1, 2, 3, 4, 5, 6]), 6);
        assert_eq!(ring.available(), 4);
        assert_eq!(ring.head(), 7);
        assert_eq!(ring.tail(), 3);
        assert_eq!(contents(&ring), [3, 4, 5, 6]);
    }

    #[test]
    fn multi_byte_elements_wrap() {
        let mut ring = Ring::new([0u8; 8], 4, 2);
        ring.write(&[1, 1, 2, 2, 3, 3]);
        ring.commit(2);
        ring.write(&[4, 4, 5, 5]);
        assert_eq!(ring.available(), 3);
        assert_eq!(contents(&ring), [3, 3, 4, 4, 5, 5]);
        // Slot 3 then wrap to slot 0.
        assert_eq!(ring.storage()[..2], [5, 5]);
    }

    #[test]
    fn commit_clamps_to_available() {
        let mut ring = Ring::new([0u8; 8], 8, 1);
        ring.write(&[1, 2, 3]);
        assert_eq!(ring.commit(10), 3);
        assert!(ring.is_empty());
        assert_eq!(ring.tail(), ring.head());
        assert_eq!(ring.commit(1), 0);
    }

    #[test]
    fn commit_zero_changes_nothing() {
        let mut ring = Ring::new([0u8; 8], 8, 1);
        ring.write(&[1, 2]);
        assert_eq!(ring.commit(0), 0);
        assert_eq!((ring.tail(), ring.head()), (0, 2));
    }

    #[test]
    fn commit_to_last_valid_element() {
        let mut ring = Ring::new([0u8; 8], 8, 1);
        ring.write(&[1, 2, 3]);
        let last = &raw const ring.storage()[2];
        assert_eq!(ring.commit_to(last), Ok(3));
        assert!(ring.is_empty());
    }

    #[test]
    fn commit_to_one_past_last_fails() {
        let mut ring = Ring::new([0u8; 8], 8, 1);
        ring.write(&[1, 2, 3]);
        let past = &raw const ring.storage()[3];
        assert_eq!(ring.commit_to(past), Err(ResolveError::NotInRange));
        assert_eq!(ring.available(), 3);
    }

    #[test]
    fn commit_to_rejects_foreign_and_misaligned() {
        let mut ring = Ring::new([0u8; 8], 4, 2);
        ring.write(&[1, 1, 2, 2]);
        let other = [0u8; 2];
        assert_eq!(
            ring.commit_to(other.as_ptr()),
            Err(ResolveError::OutOfBounds)
        );
        let inner = &raw const ring.storage()[1];
        assert_eq!(ring.commit_to(inner), Err(ResolveError::Misaligned));
        assert_eq!(ring.available(), 2);
    }

    #[test]
    fn commit_to_across_wrap() {
        let mut ring = Ring::new([0u8; 4], 4, 1);
        ring.write(&[1, 2, 3]);
        ring.commit(3);
        ring.write(&[4, 5, 6]); // slots 3, 0, 1
        let six = &raw const ring.storage()[1];
        assert_eq!(ring.commit_to(six), Ok(3));
        assert!(ring.is_empty());
    }

    #[test]
    fn trailing_storage_is_not_addressable() {
        let mut ring = Ring::new([0u8; 16], 4, 1);
        ring.write(&[1, 2, 3, 4]);
        let beyond = &raw const ring.storage()[4];
        assert_eq!(ring.commit_to(beyond), Err(ResolveError::OutOfBounds));
    }

    #[test]
    fn reset_clears_counters_only() {
        let mut ring = Ring::new([0u8; 4], 4, 1);
        ring.write(&[7, 8]);
        ring.reset();
        assert!(ring.is_empty());
        assert_eq!((ring.head(), ring.tail()), (0, 0));
        assert_eq!(ring.storage()[..2], [7, 8]);
    }

    #[test]
    fn borrowed_storage() {
        let mut backing = [0u8; 16];
        {
            let mut ring = Ring::new(&mut backing[..], 8, 2);
            ring.push(&[0xAB, 0xCD]);
            assert_eq!(ring.available(), 1);
        }
        assert_eq!(backing[..2], [0xAB, 0xCD]);
    }

    #[test]
    fn counters_survive_usize_overflow() {
        let mut ring = Ring::new([0u8; 4], 4, 1);
        ring.head = usize::MAX - 1;
        ring.tail = usize::MAX - 1;
        ring.write(&[1, 2, 3]);
        assert_eq!(ring.available(), 3);
        assert_eq!(contents(&ring), [1, 2, 3]);
        ring.write(&[4, 5]);
        assert_eq!(contents(&ring), [2, 3, 4, 5]);
        assert_eq!(ring.commit(4), 4);
        assert!(ring.is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "not a power of two")]
    fn non_power_of_two_capacity_asserts_in_debug() {
        let _ = Ring::new([0u8; 6], 6, 1);
    }

    #[test]
    fn debug_omits_storage() {
        let ring = Ring::new([0u8; 4], 4, 1);
        let s = format!("{ring:?}");
        assert!(s.contains("capacity: 4"));
        assert!(!s.contains("storage"));
    }
}
