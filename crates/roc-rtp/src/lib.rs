//! # roc-rtp
//!
//! RTP packet composition/parsing (design §4.2, §6 "Wire format — RTP")
//! and the PCM payload codec.
//!
//! ## Crate structure
//!
//! - [`composer`] — RTP header composer, with the nested-composer
//!   alignment chaining described in design §9
//! - [`parser`] — the exact inverse of the composer
//! - [`pcm`] — 16-bit big-endian / 32-bit float PCM encode/decode

pub mod composer;
pub mod parser;
pub mod pcm;

pub use composer::{NullPayloadComposer, PayloadComposer, RtpComposer, RtpHeaderFields};
pub use parser::{NullPayloadParser, PayloadParser, RtpParser};
pub use pcm::{remap_channels, PcmReader, PcmWriter, SampleFormat};
