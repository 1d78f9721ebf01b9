//! # FEC Writer
//!
//! Sender-side block buffering (design §4.3, §9 pipeline stage "FEC
//! writer"). Accepts one source payload at a time, tags it with its
//! `(sbn, esi)` position, and — once a full block's worth of source
//! payloads have arrived — asks the [`BlockEncoder`] for the block's
//! repair payloads.
//!
//! This module only manages block shape and encoder bookkeeping; turning
//! a tagged payload into a wire packet is the caller's job (composing an
//! RTP packet with the scheme's footer, e.g. [`crate::rs8m::Rs8mFooter`],
//! as a [`roc_rtp::PayloadComposer`]).

use roc_core::RocError;

use crate::block::BlockEncoder;

/// Where a just-written source payload landed in the current block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceTag {
    pub source_block_number: u16,
    pub encoding_symbol_id: u16,
    pub source_block_length: u16,
}

/// A repair payload produced when a block closes.
#[derive(Debug, Clone)]
pub struct RepairSymbol {
    pub source_block_number: u16,
    pub encoding_symbol_id: u16,
    pub source_block_length: u16,
    pub repair_symbol_count: u16,
    pub payload: Vec<u8>,
}

pub struct FecWriter<E> {
    encoder: E,
    source_count: usize,
    repair_count: usize,
    pending_resize: Option<(usize, usize)>,
    sbn: u16,
    buffered: usize,
    dead: bool,
}

impl<E: BlockEncoder> FecWriter<E> {
    pub fn new(encoder: E, source_count: usize, repair_count: usize) -> Self {
        FecWriter {
            encoder,
            source_count,
            repair_count,
            pending_resize: None,
            sbn: 0,
            buffered: 0,
            dead: false,
        }
    }

    /// Change the block shape. Takes effect at the next block boundary,
    /// never mid-block (design §4.3).
    pub fn resize(&mut self, source_count: usize, repair_count: usize) {
        self.pending_resize = Some((source_count, repair_count));
    }

    /// `true` once the encoder has failed to allocate for a block; the
    /// writer never recovers from this and every subsequent `write`
    /// returns `SessionDead`.
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Write one source payload. Returns its wire tag, plus any repair
    /// symbols produced if this payload closed the block.
    pub fn write(&mut self, payload: &[u8]) -> Result<(SourceTag, Vec<RepairSymbol>), RocError> {
        if self.dead {
            return Err(RocError::SessionDead);
        }
        if self.buffered == 0 {
            if let Some((sc, rc)) = self.pending_resize.take() {
                self.source_count = sc;
                self.repair_count = rc;
            }
            if self
                .encoder
                .begin(self.source_count, self.repair_count, payload.len())
                .is_err()
            {
                self.dead = true;
                return Err(RocError::EncoderFailed);
            }
        }
        let esi = self.buffered;
        if self
            .encoder
            .set(esi, payload)
            .inspect_err(|_| self.dead = true)
            .is_err()
        {
            return Err(RocError::EncoderFailed);
        }
        self.buffered += 1;
        let tag = SourceTag {
            source_block_number: self.sbn,
            encoding_symbol_id: esi as u16,
            source_block_length: self.source_count as u16,
        };
        let repairs = if self.buffered == self.source_count {
            self.close_block()?
        } else {
            Vec::new()
        };
        Ok((tag, repairs))
    }

    /// Close the current block early, zero-filling any source payload
    /// that was never written. Used when a latency deadline forces a
    /// block to close before it's full.
    pub fn flush(&mut self) -> Result<Vec<RepairSymbol>, RocError> {
        if self.buffered == 0 {
            return Ok(Vec::new());
        }
        for i in self.buffered..self.source_count {
            self.encoder.fill(i);
        }
        self.close_block()
    }

    fn close_block(&mut self) -> Result<Vec<RepairSymbol>, RocError> {
        let mut repairs = Vec::with_capacity(self.repair_count);
        for i in 0..self.repair_count {
            match self.encoder.get(i) {
                Ok(payload) => repairs.push(RepairSymbol {
                    source_block_number: self.sbn,
                    encoding_symbol_id: (self.source_count + i) as u16,
                    source_block_length: self.source_count as u16,
                    repair_symbol_count: self.repair_count as u16,
                    payload,
                }),
                Err(e) => {
                    self.dead = true;
                    self.encoder.end();
                    return Err(e);
                }
            }
        }
        self.encoder.end();
        self.buffered = 0;
        self.sbn = self.sbn.wrapping_add(1);
        Ok(repairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rs8m::Rs8mEncoder;

    #[test]
    fn block_closes_after_source_count_writes() {
        let mut w = FecWriter::new(Rs8mEncoder::new(), 4, 2);
        for i in 0..3 {
            let (tag, repairs) = w.write(&[i as u8; 16]).unwrap();
            assert_eq!(tag.encoding_symbol_id, i as u16);
            assert!(repairs.is_empty());
        }
        let (tag, repairs) = w.write(&[3u8; 16]).unwrap();
        assert_eq!(tag.encoding_symbol_id, 3);
        assert_eq!(repairs.len(), 2);
        assert_eq!(repairs[0].encoding_symbol_id, 4);
        assert_eq!(repairs[1].encoding_symbol_id, 5);
    }

    #[test]
    fn sbn_increments_each_block() {
        let mut w = FecWriter::new(Rs8mEncoder::new(), 2, 1);
        let (tag0, _) = w.write(&[0u8; 8]).unwrap();
        let (_, repairs0) = w.write(&[1u8; 8]).unwrap();
        assert_eq!(tag0.source_block_number, 0);
        assert_eq!(repairs0[0].source_block_number, 0);
        let (tag1, _) = w.write(&[2u8; 8]).unwrap();
        assert_eq!(tag1.source_block_number, 1);
    }

    #[test]
    fn resize_takes_effect_at_next_block_boundary() {
        let mut w = FecWriter::new(Rs8mEncoder::new(), 2, 1);
        let (_, repairs) = w.write(&[0u8; 8]).unwrap();
        assert!(repairs.is_empty());
        w.resize(3, 1);
        // current block was already sized 2 before resize was requested,
        // so it still closes at 2 source payloads, not 3.
        let (_, repairs) = w.write(&[1u8; 8]).unwrap();
        assert_eq!(repairs.len(), 1);

        // the next block picks up the new shape.
        let (_, repairs) = w.write(&[2u8; 8]).unwrap();
        assert!(repairs.is_empty());
        let (_, repairs) = w.write(&[3u8; 8]).unwrap();
        assert!(repairs.is_empty());
        let (_, repairs) = w.write(&[4u8; 8]).unwrap();
        assert_eq!(repairs.len(), 1);
    }
}
