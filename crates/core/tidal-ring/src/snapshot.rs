//! Non-consuming, point-in-time views of a ring.
//!
//! A [`Snapshot`] is a plain value: the `[tail, head)` range captured by
//! [`Ring::snapshot`] plus a cursor. It does not borrow the ring, so the
//! consumer can keep it across a [`Ring::commit`]. Every operation that
//! touches data takes the ring by shared reference and returns spans that
//! borrow it; those borrows end before the next write can happen.
//!
//! Elements written after the snapshot was taken are never visited by it.

use core::iter::FusedIterator;

use crate::ring::Ring;
use crate::slot::ResolveError;

/// A cursor over the readable range of a ring at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    tail: usize,
    head: usize,
    cursor: usize,
}

impl Snapshot {
    pub(crate) const fn new(tail: usize, head: usize) -> Self {
        Self {
            tail,
            head,
            cursor: tail,
        }
    }

    /// Total number of elements captured.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.head.wrapping_sub(self.tail)
    }

    /// Returns `true` if nothing was readable when the snapshot was taken.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Elements between the cursor and the captured head.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        let remaining = self.head.wrapping_sub(self.cursor);
        if remaining > self.len() { 0 } else { remaining }
    }

    /// Elements the cursor has moved past since the snapshot was taken.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.len() - self.remaining()
    }

    /// Logical position of the cursor.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Moves the cursor back to the captured tail.
    pub fn rewind(&mut self) {
        self.cursor = self.tail;
    }

    /// Returns the longest contiguous run of elements at the cursor and
    /// moves past it, or `None` once the snapshot is exhausted.
    ///
    /// A full traversal takes at most two calls: one up to the physical end
    /// of storage, one after the wrap.
    pub fn next_span<'r, S: AsRef<[u8]>>(&mut self, ring: &'r Ring<S>) -> Option<&'r [u8]> {
        let remaining = self.remaining();
        if remaining == 0 {
            return None;
        }
        let span = ring.contiguous(self.cursor, remaining);
        self.cursor = self.cursor.wrapping_add(span.len() / ring.elem_size());
        Some(span)
    }

    /// Returns the element at the cursor and moves past it.
    pub fn next_element<'r, S: AsRef<[u8]>>(&mut self, ring: &'r Ring<S>) -> Option<&'r [u8]> {
        let elem = self.peek(ring)?;
        self.cursor = self.cursor.wrapping_add(1);
        Some(elem)
    }

    /// Returns the element at the cursor without moving.
    #[must_use]
    pub fn peek<'r, S: AsRef<[u8]>>(&self, ring: &'r Ring<S>) -> Option<&'r [u8]> {
        if self.remaining() == 0 {
            return None;
        }
        Some(ring.contiguous(self.cursor, 1))
    }

    /// Skips up to `n` elements and returns how many were skipped.
    pub fn advance(&mut self, n: usize) -> usize {
        let n = n.min(self.remaining());
        self.cursor = self.cursor.wrapping_add(n);
        n
    }

    /// Places the cursor just after the element at `elem`.
    ///
    /// `elem` is typically the address of a delimiter found while scanning
    /// a span returned by this snapshot. The position is resolved against
    /// the whole captured range, so seeking backwards is allowed.
    ///
    /// # Errors
    ///
    /// Fails without moving the cursor if `elem` lies outside the ring's
    /// storage, is not on an element boundary, or addresses a slot that was
    /// not part of this snapshot.
    pub fn seek_to<S: AsRef<[u8]>>(
        &mut self,
        ring: &Ring<S>,
        elem: *const u8,
    ) -> Result<(), ResolveError> {
        let dist = ring.resolve(elem, self.tail, self.len())?;
        self.cursor = self.tail.wrapping_add(dist + 1);
        Ok(())
    }

    /// Iterates the spans from the cursor onwards.
    pub fn spans<S: AsRef<[u8]>>(self, ring: &Ring<S>) -> Spans<'_, S> {
        Spans { ring, snap: self }
    }

    /// Iterates single elements from the cursor onwards.
    pub fn elements<S: AsRef<[u8]>>(self, ring: &Ring<S>) -> Elements<'_, S> {
        Elements { ring, snap: self }
    }
}

/// Iterator over the contiguous spans of a [`Snapshot`].
#[derive(Debug)]
pub struct Spans<'r, S> {
    ring: &'r Ring<S>,
    snap: Snapshot,
}

impl<S> Spans<'_, S> {
    /// The snapshot in its current position.
    pub fn snapshot(&self) -> Snapshot {
        self.snap
    }
}

impl<'r, S: AsRef<[u8]>> Iterator for Spans<'r, S> {
    type Item = &'r [u8];

    fn next(&mut self) -> Option<&'r [u8]> {
        self.snap.next_span(self.ring)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.snap.remaining() {
            0 => (0, Some(0)),
            _ => (1, Some(2)),
        }
    }
}

impl<S: AsRef<[u8]>> FusedIterator for Spans<'_, S> {}

/// Iterator over the single elements of a [`Snapshot`].
#[derive(Debug)]
pub struct Elements<'r, S> {
    ring: &'r Ring<S>,
    snap: Snapshot,
}

impl<S> Elements<'_, S> {
    /// The snapshot in its current position.
    pub fn snapshot(&self) -> Snapshot {
        self.snap
    }
}

impl<'r, S: AsRef<[u8]>> Iterator for Elements<'r, S> {
    type Item = &'r [u8];

    fn next(&mut self) -> Option<&'r [u8]> {
        self.snap.next_element(self.ring)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.snap.remaining();
        (n, Some(n))
    }
}

impl<S: AsRef<[u8]>> ExactSizeIterator for Elements<'_, S> {}

impl<S: AsRef<[u8]>> FusedIterator for Elements<'_, S> {}
