//! # FEC Reader
//!
//! Receiver-side block reassembly (design §4.3, §9 pipeline stage "FEC
//! reader"). Tracks exactly one block's worth of decoder state at a
//! time, keyed by `(sbn, esi)`. Source packets are expected to already
//! be forwarded to the depacketizer by the caller as they arrive —
//! [`FecReader::push`] exists to feed the decoder and, once a block
//! closes, hand back whatever source payloads could be reconstructed
//! from repair symbols.
//!
//! ## Block-closed detection
//!
//! A block is considered closed the moment a packet for a *later* sbn
//! arrives — "later" decided via [`roc_core::modular::after_u16`], the
//! same half-space wraparound rule used everywhere else a 16-bit counter
//! is compared. A packet for an sbn that is not later than the block
//! currently open is a stale, post-close arrival and is dropped.

use roc_core::{modular, RocError};

use crate::block::BlockDecoder;

/// A source payload reconstructed from repair symbols when its block
/// closed.
#[derive(Debug, Clone)]
pub struct RecoveredSymbol {
    pub encoding_symbol_id: u16,
    pub payload: Vec<u8>,
}

pub struct FecReader<D> {
    decoder: D,
    current_sbn: Option<u16>,
    source_count: usize,
    received: Vec<bool>,
}

impl<D: BlockDecoder> FecReader<D> {
    pub fn new(decoder: D) -> Self {
        FecReader {
            decoder,
            current_sbn: None,
            source_count: 0,
            received: Vec::new(),
        }
    }

    /// Feed one arriving packet's FEC tag and payload.
    ///
    /// Returns the source payloads recovered from the *previous* block,
    /// if this arrival was the one that closed it. Usually empty.
    pub fn push(
        &mut self,
        sbn: u16,
        esi: u16,
        source_block_length: u16,
        repair_symbol_count: u16,
        is_repair: bool,
        payload: &[u8],
    ) -> Result<Vec<RecoveredSymbol>, RocError> {
        let mut closed = Vec::new();
        match self.current_sbn {
            None => {
                self.begin_block(
                    sbn,
                    source_block_length as usize,
                    repair_symbol_count as usize,
                    payload.len(),
                )?;
            }
            Some(cur) if cur == sbn => {}
            Some(cur) => {
                if modular::after_u16(sbn, cur) {
                    closed = self.close_block();
                    self.begin_block(
                        sbn,
                        source_block_length as usize,
                        repair_symbol_count as usize,
                        payload.len(),
                    )?;
                } else {
                    // Arrival for a block that has already closed.
                    return Ok(closed);
                }
            }
        }

        let index = if is_repair {
            esi as usize - self.source_count
        } else {
            esi as usize
        };
        self.decoder.set(index, is_repair, payload)?;
        if !is_repair {
            if let Some(slot) = self.received.get_mut(index) {
                *slot = true;
            }
        }
        Ok(closed)
    }

    /// Force-close whatever block is currently open, e.g. on session
    /// teardown or watchdog expiry. Subsequent `push` calls start fresh.
    pub fn flush(&mut self) -> Vec<RecoveredSymbol> {
        if self.current_sbn.is_none() {
            return Vec::new();
        }
        let out = self.close_block();
        self.current_sbn = None;
        out
    }

    fn begin_block(
        &mut self,
        sbn: u16,
        source_count: usize,
        repair_count: usize,
        payload_size: usize,
    ) -> Result<(), RocError> {
        self.decoder.begin(source_count, repair_count, payload_size)?;
        self.current_sbn = Some(sbn);
        self.source_count = source_count;
        self.received = vec![false; source_count];
        Ok(())
    }

    fn close_block(&mut self) -> Vec<RecoveredSymbol> {
        let mut out = Vec::new();
        for i in 0..self.source_count {
            if !self.received[i] {
                if let Ok(payload) = self.decoder.repair(i) {
                    out.push(RecoveredSymbol {
                        encoding_symbol_id: i as u16,
                        payload,
                    });
                }
            }
        }
        self.decoder.end();
        out
    }
}
