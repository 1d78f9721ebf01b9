//! # roc-fec
//!
//! Block FEC (design §4.3): a sender-side [`writer::FecWriter`] buffers
//! source packets into fixed-size blocks and emits repair packets, and a
//! receiver-side [`reader::FecReader`] reassembles a block from whatever
//! source/repair packets arrive and asks the decoder to reconstruct the
//! rest.
//!
//! [`block`] defines the encoder/decoder trait contract every FEC scheme
//! implements. [`rs8m`] is the one scheme with a concrete codec, backed by
//! `reed-solomon-simd`. [`ldpc`] carries the LDPC-Staircase wire footer
//! only — no decoder, matching upstream's "LDPC-Staircase is
//! interoperability-only" stance.

pub mod block;
pub mod ldpc;
pub mod reader;
pub mod rs8m;
pub mod writer;

pub use block::{BlockDecoder, BlockEncoder};
pub use reader::FecReader;
pub use rs8m::{Rs8mDecoder, Rs8mEncoder};
pub use writer::FecWriter;
