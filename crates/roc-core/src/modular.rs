//! # Signed-Modular Arithmetic
//!
//! RTP sequence numbers (16-bit), RTP timestamps and FEC source-block
//! numbers (16-bit) all wrap. Comparing them naively breaks down near the
//! wraparound boundary, so every comparison in the validator, jitter
//! buffer, and FEC reader goes through the helpers here instead of `<`/`>`
//! on the raw integer.
//!
//! The convention (matching RFC 1982 serial number arithmetic): given two
//! values `a` and `b` of a wrapping counter with a total space of `2^bits`,
//! `a` is considered "ahead of" `b` if the signed difference `a - b`,
//! computed modulo `2^bits` and reinterpreted as a signed value, is
//! positive. This is well-defined as long as true gaps never exceed half
//! the counter's space, which every caller in this codebase enforces via
//! `max_sn_jump`/`max_ts_jump`-style bounds.

/// Signed modular difference `a - b` for a 16-bit wrapping counter.
///
/// Returns a value in `[-32768, 32767]`.
#[inline]
pub fn diff_u16(a: u16, b: u16) -> i32 {
    (a.wrapping_sub(b) as i16) as i32
}

/// Signed modular difference `a - b` for a 32-bit wrapping counter.
///
/// Returns a value in `[i32::MIN, i32::MAX]`.
#[inline]
pub fn diff_u32(a: u32, b: u32) -> i64 {
    (a.wrapping_sub(b) as i32) as i64
}

/// `true` if `a` comes strictly after `b` in modular order.
#[inline]
pub fn after_u16(a: u16, b: u16) -> bool {
    diff_u16(a, b) > 0
}

/// `true` if `a` comes strictly after `b` in modular order.
#[inline]
pub fn after_u32(a: u32, b: u32) -> bool {
    diff_u32(a, b) > 0
}

/// Modular ordering for a 16-bit wrapping counter. Only meaningful when the
/// true distance between `a` and `b` is known to be less than half the
/// counter space (2^15); see module docs.
#[inline]
pub fn cmp_u16(a: u16, b: u16) -> std::cmp::Ordering {
    diff_u16(a, b).cmp(&0)
}

/// Modular ordering for a 32-bit wrapping counter.
#[inline]
pub fn cmp_u32(a: u32, b: u32) -> std::cmp::Ordering {
    diff_u32(a, b).cmp(&0)
}

/// Half of the sbn space (2^16), used by the FEC reader as its block-closed
/// detection window: a newly observed sbn more than this far ahead of the
/// current block is treated as "later", never "wrapped back to earlier".
pub const SBN_WRAP_WINDOW: u16 = 1 << 15;
