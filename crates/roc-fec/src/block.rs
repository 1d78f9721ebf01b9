//! # Block FEC Trait Contract
//!
//! Every FEC scheme's codec is driven through the same four-call
//! lifecycle (design §4.3), mirroring how a block is actually produced
//! or consumed one symbol at a time rather than all at once:
//!
//! - encoder: `begin` a block of `k` source + `m` repair symbols, `set`
//!   each source symbol as it becomes available, `fill` pads any source
//!   symbol the caller never set (used when a block is flushed early),
//!   `get` a repair symbol once all source symbols are set, `end` the
//!   block.
//! - decoder: `begin` a block, `set` each source/repair symbol as it
//!   arrives (in any order), `repair` a missing source symbol once
//!   enough symbols have arrived, `end` the block.

use roc_core::RocError;

/// Maximum symbols a single block may contain, regardless of scheme.
/// RS8M's 8-bit encoding symbol ID field caps this at 255.
pub const MAX_BLOCK_LENGTH: usize = 255;

/// Encoder side of a block FEC scheme.
pub trait BlockEncoder {
    /// Begin a new block of `source_count` source symbols producing
    /// `repair_count` repair symbols, each `payload_size` bytes.
    fn begin(
        &mut self,
        source_count: usize,
        repair_count: usize,
        payload_size: usize,
    ) -> Result<(), RocError>;

    /// Record source symbol `index`'s payload.
    fn set(&mut self, index: usize, data: &[u8]) -> Result<(), RocError>;

    /// Zero-fill a source symbol the caller never supplied (a block
    /// flushed before it was full still needs every symbol set before
    /// repair symbols can be computed).
    fn fill(&mut self, index: usize);

    /// Compute and return repair symbol `index` (`0..repair_count`).
    /// Only valid after every source symbol has been `set` or `fill`ed.
    fn get(&mut self, index: usize) -> Result<Vec<u8>, RocError>;

    /// Release any block-scoped state. The encoder is ready for the next
    /// `begin` afterward.
    fn end(&mut self);
}

/// Decoder side of a block FEC scheme.
pub trait BlockDecoder {
    /// Begin a new block with the given shape, mirroring the encoder's
    /// `begin`.
    fn begin(
        &mut self,
        source_count: usize,
        repair_count: usize,
        payload_size: usize,
    ) -> Result<(), RocError>;

    /// Record a source (`is_repair = false`) or repair (`is_repair =
    /// true`) symbol as it arrives.
    fn set(&mut self, index: usize, is_repair: bool, data: &[u8]) -> Result<(), RocError>;

    /// Attempt to reconstruct source symbol `index`. Returns
    /// `DecoderUnrecoverable` if not enough symbols have arrived yet.
    fn repair(&mut self, index: usize) -> Result<Vec<u8>, RocError>;

    /// Release any block-scoped state.
    fn end(&mut self);
}
