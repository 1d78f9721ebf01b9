//! Sender-side pipeline stages: packetize, then interleave before the
//! FEC writer and UDP output (design §4.3-§4.4).

pub mod interleaver;
pub mod packetizer;
pub mod sink;

pub use interleaver::{default_permutation, Interleaver};
pub use packetizer::{Packetizer, PacketizerConfig};
pub use sink::{FecConfig, SenderSink};
