//! # RS8M
//!
//! The one FEC scheme with a concrete codec in this stack: Reed-Solomon
//! over GF(2^8), symbol IDs 0..255 (hence "8M" — 8-bit, up to ~256
//! symbols per block). Encoding/decoding is delegated to
//! `reed-solomon-simd`; this module owns the block bookkeeping and the
//! 6-byte wire footer.
//!
//! ## Wire footer (design §6)
//!
//! Appended after the RTP payload on every packet belonging to an RS8M
//! stream, 6 bytes: `sbn:u16 | k:u16 | esi:u8 | m:u8`.

use roc_core::RocError;
use roc_rtp::{PayloadComposer, PayloadParser};

use crate::block::{BlockDecoder, BlockEncoder};

pub const RS8M_FOOTER_LEN: usize = 6;

/// RS8M footer fields carried on every packet of a stream using this
/// scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rs8mFooter {
    pub source_block_number: u16,
    pub source_block_length: u16,
    pub encoding_symbol_id: u8,
    pub repair_symbol_count: u8,
}

impl Rs8mFooter {
    pub fn encode(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), RS8M_FOOTER_LEN);
        out[0..2].copy_from_slice(&self.source_block_number.to_be_bytes());
        out[2..4].copy_from_slice(&self.source_block_length.to_be_bytes());
        out[4] = self.encoding_symbol_id;
        out[5] = self.repair_symbol_count;
    }

    pub fn decode(data: &[u8]) -> Result<Rs8mFooter, RocError> {
        if data.len() != RS8M_FOOTER_LEN {
            return Err(RocError::BadFormat);
        }
        Ok(Rs8mFooter {
            source_block_number: u16::from_be_bytes([data[0], data[1]]),
            source_block_length: u16::from_be_bytes([data[2], data[3]]),
            encoding_symbol_id: data[4],
            repair_symbol_count: data[5],
        })
    }
}

/// Composes the RS8M footer as an RTP payload suffix.
impl PayloadComposer for Rs8mFooter {
    fn prefix_len(&self) -> usize {
        0
    }
    fn suffix_len(&self) -> usize {
        RS8M_FOOTER_LEN
    }
    fn write_prefix(&self, _buf: &mut [u8]) {}
    fn write_suffix(&self, buf: &mut [u8]) {
        self.encode(buf);
    }
}

/// Parses the RS8M footer back out of an RTP payload suffix. Since the
/// footer is a fixed 6 bytes at the tail, parsing first needs the
/// payload to be at least that long.
pub struct Rs8mFooterParser;

impl PayloadParser for Rs8mFooterParser {
    fn split(&self, body: &[u8]) -> Option<std::ops::Range<usize>> {
        if body.len() < RS8M_FOOTER_LEN {
            return None;
        }
        Some(0..(body.len() - RS8M_FOOTER_LEN))
    }
}

impl Rs8mFooterParser {
    /// Parse the footer out of the same body the payload was split from.
    pub fn footer(&self, body: &[u8]) -> Result<Rs8mFooter, RocError> {
        if body.len() < RS8M_FOOTER_LEN {
            return Err(RocError::BadFormat);
        }
        Rs8mFooter::decode(&body[body.len() - RS8M_FOOTER_LEN..])
    }
}

/// RS8M block encoder, backed by `reed_solomon_simd::ReedSolomonEncoder`.
pub struct Rs8mEncoder {
    source_count: usize,
    repair_count: usize,
    payload_size: usize,
    sources: Vec<Option<Vec<u8>>>,
    repairs: Option<Vec<Vec<u8>>>,
}

impl Rs8mEncoder {
    pub fn new() -> Self {
        Rs8mEncoder {
            source_count: 0,
            repair_count: 0,
            payload_size: 0,
            sources: Vec::new(),
            repairs: None,
        }
    }

    fn compute_repairs(&mut self) -> Result<(), RocError> {
        let mut encoder = reed_solomon_simd::ReedSolomonEncoder::new(
            self.source_count,
            self.repair_count,
            self.payload_size,
        )
        .map_err(|_| RocError::EncoderFailed)?;
        for slot in &self.sources {
            let data = slot.as_ref().ok_or(RocError::EncoderFailed)?;
            encoder
                .add_original_shard(data)
                .map_err(|_| RocError::EncoderFailed)?;
        }
        let result = encoder.encode().map_err(|_| RocError::EncoderFailed)?;
        let repairs: Vec<Vec<u8>> = result
            .recovery_iter()
            .map(|shard| shard.to_vec())
            .collect();
        self.repairs = Some(repairs);
        Ok(())
    }
}

impl Default for Rs8mEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockEncoder for Rs8mEncoder {
    fn begin(
        &mut self,
        source_count: usize,
        repair_count: usize,
        payload_size: usize,
    ) -> Result<(), RocError> {
        if source_count == 0 || source_count + repair_count > crate::block::MAX_BLOCK_LENGTH {
            return Err(RocError::OutOfRange);
        }
        self.source_count = source_count;
        self.repair_count = repair_count;
        self.payload_size = payload_size;
        self.sources = vec![None; source_count];
        self.repairs = None;
        Ok(())
    }

    fn set(&mut self, index: usize, data: &[u8]) -> Result<(), RocError> {
        let slot = self.sources.get_mut(index).ok_or(RocError::OutOfRange)?;
        if data.len() != self.payload_size {
            return Err(RocError::BadFormat);
        }
        *slot = Some(data.to_vec());
        Ok(())
    }

    fn fill(&mut self, index: usize) {
        if let Some(slot) = self.sources.get_mut(index) {
            if slot.is_none() {
                *slot = Some(vec![0u8; self.payload_size]);
            }
        }
    }

    fn get(&mut self, index: usize) -> Result<Vec<u8>, RocError> {
        if self.repairs.is_none() {
            self.compute_repairs()?;
        }
        self.repairs
            .as_ref()
            .and_then(|r| r.get(index))
            .cloned()
            .ok_or(RocError::OutOfRange)
    }

    fn end(&mut self) {
        self.sources.clear();
        self.repairs = None;
    }
}

/// RS8M block decoder, backed by `reed_solomon_simd::ReedSolomonDecoder`.
pub struct Rs8mDecoder {
    source_count: usize,
    repair_count: usize,
    payload_size: usize,
    sources: Vec<Option<Vec<u8>>>,
    repairs: Vec<Option<Vec<u8>>>,
    restored: Option<Vec<Vec<u8>>>,
}

impl Rs8mDecoder {
    pub fn new() -> Self {
        Rs8mDecoder {
            source_count: 0,
            repair_count: 0,
            payload_size: 0,
            sources: Vec::new(),
            repairs: Vec::new(),
            restored: None,
        }
    }

    fn try_decode(&mut self) -> Result<(), RocError> {
        let mut decoder = reed_solomon_simd::ReedSolomonDecoder::new(
            self.source_count,
            self.repair_count,
            self.payload_size,
        )
        .map_err(|_| RocError::DecoderUnrecoverable)?;
        for (i, slot) in self.sources.iter().enumerate() {
            if let Some(data) = slot {
                decoder
                    .add_original_shard(i, data)
                    .map_err(|_| RocError::DecoderUnrecoverable)?;
            }
        }
        for (i, slot) in self.repairs.iter().enumerate() {
            if let Some(data) = slot {
                decoder
                    .add_recovery_shard(i, data)
                    .map_err(|_| RocError::DecoderUnrecoverable)?;
            }
        }
        let result = decoder.decode().map_err(|_| RocError::DecoderUnrecoverable)?;
        let mut restored = vec![Vec::new(); self.source_count];
        for (index, shard) in result.restored_original_iter() {
            restored[index] = shard.to_vec();
        }
        self.restored = Some(restored);
        Ok(())
    }
}

impl Default for Rs8mDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockDecoder for Rs8mDecoder {
    fn begin(
        &mut self,
        source_count: usize,
        repair_count: usize,
        payload_size: usize,
    ) -> Result<(), RocError> {
        if source_count == 0 || source_count + repair_count > crate::block::MAX_BLOCK_LENGTH {
            return Err(RocError::OutOfRange);
        }
        self.source_count = source_count;
        self.repair_count = repair_count;
        self.payload_size = payload_size;
        self.sources = vec![None; source_count];
        self.repairs = vec![None; repair_count];
        self.restored = None;
        Ok(())
    }

    fn set(&mut self, index: usize, is_repair: bool, data: &[u8]) -> Result<(), RocError> {
        let slot = if is_repair {
            self.repairs.get_mut(index)
        } else {
            self.sources.get_mut(index)
        }
        .ok_or(RocError::OutOfRange)?;
        *slot = Some(data.to_vec());
        self.restored = None;
        Ok(())
    }

    fn repair(&mut self, index: usize) -> Result<Vec<u8>, RocError> {
        if index >= self.source_count {
            return Err(RocError::OutOfRange);
        }
        if let Some(data) = &self.sources[index] {
            return Ok(data.clone());
        }
        if self.restored.is_none() {
            self.try_decode()?;
        }
        let restored = self.restored.as_ref().expect("just computed");
        let data = &restored[index];
        if data.is_empty() {
            return Err(RocError::DecoderUnrecoverable);
        }
        Ok(data.clone())
    }

    fn end(&mut self) {
        self.sources.clear();
        self.repairs.clear();
        self.restored = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footer_round_trips() {
        let footer = Rs8mFooter {
            source_block_number: 1000,
            source_block_length: 20,
            encoding_symbol_id: 5,
            repair_symbol_count: 4,
        };
        let mut buf = [0u8; RS8M_FOOTER_LEN];
        footer.encode(&mut buf);
        assert_eq!(Rs8mFooter::decode(&buf).unwrap(), footer);
    }

    #[test]
    fn footer_decode_rejects_wrong_length() {
        assert_eq!(Rs8mFooter::decode(&[0u8; 3]).unwrap_err(), RocError::BadFormat);
    }

    #[test]
    fn encoder_recovers_decoder_with_one_loss() {
        let k = 4;
        let m = 2;
        let payload_size = 32;
        let sources: Vec<Vec<u8>> = (0..k).map(|i| vec![i as u8; payload_size]).collect();

        let mut enc = Rs8mEncoder::new();
        enc.begin(k, m, payload_size).unwrap();
        for (i, src) in sources.iter().enumerate() {
            enc.set(i, src).unwrap();
        }
        let repairs: Vec<Vec<u8>> = (0..m).map(|i| enc.get(i).unwrap()).collect();

        let mut dec = Rs8mDecoder::new();
        dec.begin(k, m, payload_size).unwrap();
        for i in 0..k {
            if i != 2 {
                dec.set(i, false, &sources[i]).unwrap();
            }
        }
        dec.set(0, true, &repairs[0]).unwrap();

        let recovered = dec.repair(2).unwrap();
        assert_eq!(recovered, sources[2]);
    }

    #[test]
    fn decoder_reports_unrecoverable_with_too_many_losses() {
        let k = 4;
        let m = 1;
        let payload_size = 16;
        let mut dec = Rs8mDecoder::new();
        dec.begin(k, m, payload_size).unwrap();
        dec.set(0, false, &[1u8; 16]).unwrap();
        assert_eq!(dec.repair(2).unwrap_err(), RocError::DecoderUnrecoverable);
    }
}
