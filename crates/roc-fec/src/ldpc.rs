//! # LDPC-Staircase Wire Footer
//!
//! LDPC-Staircase is carried for wire interoperability only: this module
//! defines the 8-byte footer layout so a packet using this scheme parses
//! cleanly, but there is no encoder or decoder here. A stream negotiated
//! to LDPC-Staircase has no local repair capability in this stack (design
//! §4.3 non-goal).

use roc_core::RocError;
use roc_rtp::{PayloadComposer, PayloadParser};

pub const LDPC_FOOTER_LEN: usize = 8;

/// LDPC-Staircase footer fields: `sbn:u16 | esi:u16 | k:u16 | n:u16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LdpcStaircaseFooter {
    pub source_block_number: u16,
    pub encoding_symbol_id: u16,
    pub source_symbol_count: u16,
    pub total_symbol_count: u16,
}

impl LdpcStaircaseFooter {
    pub fn encode(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), LDPC_FOOTER_LEN);
        out[0..2].copy_from_slice(&self.source_block_number.to_be_bytes());
        out[2..4].copy_from_slice(&self.encoding_symbol_id.to_be_bytes());
        out[4..6].copy_from_slice(&self.source_symbol_count.to_be_bytes());
        out[6..8].copy_from_slice(&self.total_symbol_count.to_be_bytes());
    }

    pub fn decode(data: &[u8]) -> Result<LdpcStaircaseFooter, RocError> {
        if data.len() != LDPC_FOOTER_LEN {
            return Err(RocError::BadFormat);
        }
        Ok(LdpcStaircaseFooter {
            source_block_number: u16::from_be_bytes([data[0], data[1]]),
            encoding_symbol_id: u16::from_be_bytes([data[2], data[3]]),
            source_symbol_count: u16::from_be_bytes([data[4], data[5]]),
            total_symbol_count: u16::from_be_bytes([data[6], data[7]]),
        })
    }
}

impl PayloadComposer for LdpcStaircaseFooter {
    fn prefix_len(&self) -> usize {
        0
    }
    fn suffix_len(&self) -> usize {
        LDPC_FOOTER_LEN
    }
    fn write_prefix(&self, _buf: &mut [u8]) {}
    fn write_suffix(&self, buf: &mut [u8]) {
        self.encode(buf);
    }
}

pub struct LdpcStaircaseFooterParser;

impl PayloadParser for LdpcStaircaseFooterParser {
    fn split(&self, body: &[u8]) -> Option<std::ops::Range<usize>> {
        if body.len() < LDPC_FOOTER_LEN {
            return None;
        }
        Some(0..(body.len() - LDPC_FOOTER_LEN))
    }
}
