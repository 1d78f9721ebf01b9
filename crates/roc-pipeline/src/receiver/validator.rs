//! # RTP Validator
//!
//! Per-session gate between the parser and the jitter buffer (design
//! §4.10). The session's identity (payload type, source id) is learned
//! from the first packet it accepts, not preconfigured; every later
//! packet must match it. Sequence number and timestamp are tracked as a
//! running maximum: a packet behind that maximum is always accepted
//! (it's simply late), while a packet that jumps the maximum forward by
//! more than the configured bound is rejected. A rejection here only
//! drops the one packet — repeated violations never kill the session by
//! themselves, that's the watchdog's job.

use roc_core::{modular, RocError};
use roc_packet::packet::RtpView;

#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct ValidatorConfig {
    pub max_sn_jump: u16,
    pub max_ts_jump: u32,
}

pub struct Validator {
    config: ValidatorConfig,
    source_id: Option<u32>,
    payload_type: Option<u8>,
    max_seqnum: Option<u16>,
    max_timestamp: Option<u32>,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Validator {
            config,
            source_id: None,
            payload_type: None,
            max_seqnum: None,
            max_timestamp: None,
        }
    }

    /// Validate `view` against this session's learned identity and jump
    /// bounds. On success, updates the learned identity (first call only)
    /// and the running sequence/timestamp maximum.
    pub fn validate(&mut self, view: &RtpView) -> Result<(), RocError> {
        if let Some(source_id) = self.source_id {
            if view.source_id != source_id {
                return Err(RocError::BadFormat);
            }
        }
        if let Some(payload_type) = self.payload_type {
            if view.payload_type != payload_type {
                return Err(RocError::BadFormat);
            }
        }
        if let Some(max_sn) = self.max_seqnum {
            let jump = modular::diff_u16(view.seqnum, max_sn);
            if jump > 0 && jump as u32 > self.config.max_sn_jump as u32 {
                return Err(RocError::OutOfRange);
            }
        }
        if let Some(max_ts) = self.max_timestamp {
            let jump = modular::diff_u32(view.timestamp, max_ts);
            if jump > 0 && jump as u64 > self.config.max_ts_jump as u64 {
                return Err(RocError::OutOfRange);
            }
        }

        self.source_id.get_or_insert(view.source_id);
        self.payload_type.get_or_insert(view.payload_type);
        if self
            .max_seqnum
            .map_or(true, |m| modular::after_u16(view.seqnum, m))
        {
            self.max_seqnum = Some(view.seqnum);
        }
        if self
            .max_timestamp
            .map_or(true, |m| modular::after_u32(view.timestamp, m))
        {
            self.max_timestamp = Some(view.timestamp);
        }
        Ok(())
    }
}
