//! # Interleaver
//!
//! Spreads a block of `n` consecutive packets across a fixed permutation
//! before they go out on the wire, so that a burst loss in transit hits
//! packets that are non-adjacent in the original stream (design §4.4).
//! The interleaver only ever reorders within one block; it never holds a
//! packet back across a block boundary.

use roc_packet::packet::Packet;

/// A deterministic stride-based permutation of `0..n`: position `i`
/// sends the packet that was pushed `permutation[i]`-th. The stride is
/// chosen coprime with `n` so every slot is visited exactly once.
pub fn default_permutation(n: usize) -> Vec<usize> {
    if n <= 1 {
        return (0..n).collect();
    }
    let stride = (0..n)
        .rev()
        .find(|s| *s > 0 && gcd(*s, n) == 1)
        .unwrap_or(1);
    (0..n).map(|i| (i * stride) % n).collect()
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

pub struct Interleaver {
    permutation: Vec<usize>,
    slots: Vec<Option<Packet>>,
    filled: usize,
}

impl Interleaver {
    pub fn new(permutation: Vec<usize>) -> Self {
        let n = permutation.len();
        Interleaver {
            permutation,
            slots: vec![None; n],
            filled: 0,
        }
    }

    /// Push the next packet in stream order. Once a full block has been
    /// pushed, returns that block's packets in permuted order; otherwise
    /// returns an empty vec.
    pub fn push(&mut self, packet: Packet) -> Vec<Packet> {
        if self.slots.is_empty() {
            return vec![packet];
        }
        self.slots[self.filled] = Some(packet);
        self.filled += 1;
        if self.filled == self.slots.len() {
            self.drain_permuted()
        } else {
            Vec::new()
        }
    }

    fn drain_permuted(&mut self) -> Vec<Packet> {
        let mut out = Vec::with_capacity(self.slots.len());
        for &slot in &self.permutation {
            if let Some(p) = self.slots[slot].take() {
                out.push(p);
            }
        }
        self.filled = 0;
        out
    }

    /// Drain whatever is buffered in stream (slot) order, not permuted —
    /// used when a block is flushed before it filled, since the
    /// permutation assumes a complete block.
    pub fn flush(&mut self) -> Vec<Packet> {
        let mut out = Vec::new();
        for slot in self.slots.iter_mut() {
            if let Some(p) = slot.take() {
                out.push(p);
            }
        }
        self.filled = 0;
        out
    }
}
