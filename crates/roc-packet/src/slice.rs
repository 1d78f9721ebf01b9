//! # Slice
//!
//! A `(buffer, offset, length)` view sharing ownership of a pool-allocated
//! backing buffer (design §3). Slices may be narrowed but never widened
//! beyond the capacity they were created with; narrowing never copies.
//!
//! Construction follows a builder/freeze split, mirroring the
//! mutable-then-immutable pattern the ecosystem uses for pooled buffers:
//! [`SliceMut`] gives exclusive write access while composing a packet;
//! [`SliceMut::freeze`] turns it into a read-only, shareable [`Slice`]. A
//! frozen `Slice` is never reassigned to new backing storage — narrowing
//! only ever shrinks the `(offset, length)` window over the same
//! underlying allocation.

use roc_core::RocError;
use std::sync::Arc;

use crate::pool::{BufferPool, PooledBuffer};

/// An immutable, shareable view into a pool-owned buffer.
#[derive(Clone)]
pub struct Slice {
    backing: Arc<PooledBuffer>,
    offset: usize,
    len: usize,
}

impl Slice {
    /// Full length of this view.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Borrow the bytes this slice covers.
    pub fn as_bytes(&self) -> &[u8] {
        &self.backing[self.offset..self.offset + self.len]
    }

    /// Return a narrower view over `[start, start+len)` of this slice.
    /// `None` if the requested window exceeds this slice's bounds — a
    /// `Slice` can never be widened past what it was created with.
    pub fn narrow(&self, start: usize, len: usize) -> Option<Slice> {
        if start.checked_add(len)? > self.len {
            return None;
        }
        Some(Slice {
            backing: self.backing.clone(),
            offset: self.offset + start,
            len,
        })
    }
}

impl std::ops::Deref for Slice {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// A uniquely-owned, mutable buffer acquired from a pool. Call [`freeze`]
/// once composition (e.g. writing an RTP header) is complete to obtain a
/// shareable, immutable [`Slice`].
///
/// [`freeze`]: SliceMut::freeze
pub struct SliceMut {
    backing: PooledBuffer,
    len: usize,
}

impl SliceMut {
    /// Acquire a fresh buffer from `pool`. The returned `SliceMut` covers
    /// the whole buffer; shrink with [`truncate`] before freezing if only
    /// part of it was written.
    ///
    /// [`truncate`]: SliceMut::truncate
    pub fn acquire(pool: &BufferPool) -> Result<SliceMut, RocError> {
        let backing = pool.acquire()?;
        let len = backing.len();
        Ok(SliceMut { backing, len })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Shrink the usable length. Returns `WouldTruncate`-free: shrinking
    /// never fails, it only ever reduces `len`. Growing back past the
    /// backing capacity is impossible by construction.
    pub fn truncate(&mut self, len: usize) {
        self.len = self.len.min(len);
    }

    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.backing[..self.len]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.backing[..self.len]
    }

    /// Consume this builder, yielding a shareable, immutable `Slice`.
    /// Once frozen, the data is never reassigned (design §3 invariant).
    pub fn freeze(self) -> Slice {
        let len = self.len;
        Slice {
            backing: Arc::new(self.backing),
            offset: 0,
            len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{LeakMode, PoisonMode};

    fn pool() -> BufferPool {
        BufferPool::new("test", 4, 16, PoisonMode::Disabled, LeakMode::Ignore)
    }

    #[test]
    fn narrow_shrinks_without_copy() {
        let pool = pool();
        let mut m = SliceMut::acquire(&pool).unwrap();
        m.as_mut_bytes().copy_from_slice(&[1u8; 16]);
        let s = m.freeze();
        let n = s.narrow(4, 8).unwrap();
        assert_eq!(n.len(), 8);
        assert_eq!(n.as_bytes(), &[1u8; 8]);
    }

    #[test]
    fn narrow_rejects_widening() {
        let pool = pool();
        let m = SliceMut::acquire(&pool).unwrap();
        let s = m.freeze();
        assert!(s.narrow(0, 17).is_none());
        assert!(s.narrow(10, 10).is_none());
    }

    #[test]
    fn truncate_then_freeze_limits_visible_len() {
        let pool = pool();
        let mut m = SliceMut::acquire(&pool).unwrap();
        m.truncate(5);
        let s = m.freeze();
        assert_eq!(s.len(), 5);
    }

    #[test]
    fn clones_share_backing_and_release_once() {
        let pool = pool();
        let m = SliceMut::acquire(&pool).unwrap();
        let s = m.freeze();
        let s2 = s.clone();
        assert_eq!(pool.outstanding(), 1);
        drop(s);
        assert_eq!(pool.outstanding(), 1, "still held by s2");
        drop(s2);
        assert_eq!(pool.outstanding(), 0);
    }
}
