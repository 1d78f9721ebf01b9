//! # Error Taxonomy
//!
//! All failure modes are non-exceptional: callers match on `RocError` and
//! decide locally whether to drop a packet, bump a counter, or mark a
//! session dead. Nothing in this crate (or its dependents) panics on a
//! malformed packet or a full pool.

use std::fmt;

/// The shared error taxonomy for the Roc streaming core.
///
/// Propagation policy (see design §7):
/// - `BadFormat` / `OutOfRange` are local: the packet is dropped, a counter
///   bumped, the pipeline continues.
/// - `PoolExhausted` skips repair generation on the sender, drops the
///   arrival on the receiver.
/// - `SessionDead` / `DecoderUnrecoverable` are session-fatal: the session
///   is marked for reaping, other sessions are unaffected.
/// - `TaskTimeout` only ever returns to a synchronous task caller; the task
///   itself remains scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RocError {
    /// A pool had no free slots to satisfy an allocation.
    PoolExhausted,
    /// A packet failed to parse (bad version, truncated header, ...).
    BadFormat,
    /// A value fell outside a configured or protocol-mandated bound.
    OutOfRange,
    /// A write would not fit in the destination slice.
    WouldTruncate,
    /// The session has been marked dead (watchdog, latency bounds, or
    /// identity change) and must be reaped.
    SessionDead,
    /// The FEC encoder failed to produce repair symbols.
    EncoderFailed,
    /// The FEC decoder could not reconstruct a packet from what it has
    /// seen so far.
    DecoderUnrecoverable,
    /// A synchronously-submitted task did not complete before its
    /// deadline. The task itself is still running.
    TaskTimeout,
}

impl fmt::Display for RocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            RocError::PoolExhausted => "pool exhausted",
            RocError::BadFormat => "malformed packet",
            RocError::OutOfRange => "value out of configured range",
            RocError::WouldTruncate => "destination slice too small",
            RocError::SessionDead => "session is dead",
            RocError::EncoderFailed => "FEC encoder failed",
            RocError::DecoderUnrecoverable => "FEC block unrecoverable",
            RocError::TaskTimeout => "task did not complete before deadline",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for RocError {}
