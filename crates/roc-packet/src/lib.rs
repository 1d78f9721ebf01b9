//! # roc-packet
//!
//! Packet pools, slices, and the reference-counted packet type (design §3,
//! §4.1).
//!
//! ## Crate structure
//!
//! - [`pool`] — lock-free fast-path / mutex-fallback bounded pool, with
//!   optional poisoning and process-wide leak detection
//! - [`slice`] — pool-owned `(buffer, offset, length)` views
//! - [`packet`] — the reference-counted, multi-view packet

pub mod packet;
pub mod pool;
pub mod slice;

pub use packet::{FecView, Flags, Packet, RtpView, UdpView};
pub use pool::{BufferPool, LeakMode, PoisonMode};
pub use slice::Slice;
