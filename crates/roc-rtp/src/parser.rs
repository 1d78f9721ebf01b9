//! # RTP Parser
//!
//! The exact inverse of [`crate::composer::RtpComposer`]: validates the
//! fixed 12-byte header and hands back an [`RtpView`] whose `payload`
//! slice is narrowed to the bytes after the header (and, when a nested
//! payload parser is supplied, after its prefix and before its suffix).

use roc_core::RocError;
use roc_packet::packet::RtpView;
use roc_packet::slice::Slice;

use crate::composer::RTP_HEADER_LEN;

/// The inverse of [`crate::composer::PayloadComposer`]: strips a nested
/// prefix/suffix from the region after the fixed RTP header, returning the
/// inner payload slice.
pub trait PayloadParser {
    /// Split `body` (everything after the 12-byte RTP header) into the
    /// actual audio/FEC payload. Returns `None` on malformed input.
    fn split(&self, body: &[u8]) -> Option<std::ops::Range<usize>>;
}

/// The trivial payload parser for bare RTP: the whole body is payload.
pub struct NullPayloadParser;

impl PayloadParser for NullPayloadParser {
    fn split(&self, body: &[u8]) -> Option<std::ops::Range<usize>> {
        Some(0..body.len())
    }
}

pub struct RtpParser;

impl RtpParser {
    /// `duration` is not carried on the wire; callers fill it in from the
    /// stream's configured samples-per-packet once parsing succeeds.
    pub fn parse(
        data: &Slice,
        inner: &dyn PayloadParser,
        duration: u32,
    ) -> Result<RtpView, RocError> {
        if data.len() < RTP_HEADER_LEN {
            return Err(RocError::BadFormat);
        }
        let bytes = data.as_bytes();
        let version = bytes[0] >> 6;
        if version != 2 {
            return Err(RocError::BadFormat);
        }
        let padding = bytes[0] & 0b0010_0000 != 0;
        let extension = bytes[0] & 0b0001_0000 != 0;
        let cc = bytes[0] & 0b0000_1111;
        if padding || extension || cc != 0 {
            // Padding/header-extension/CSRC lists are not produced by this
            // stack and are rejected rather than silently ignored.
            return Err(RocError::BadFormat);
        }
        let marker = bytes[1] & 0b1000_0000 != 0;
        let payload_type = bytes[1] & 0b0111_1111;
        let seqnum = u16::from_be_bytes([bytes[2], bytes[3]]);
        let timestamp = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        let source_id = u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);

        let body = data.narrow(RTP_HEADER_LEN, data.len() - RTP_HEADER_LEN).ok_or(RocError::BadFormat)?;
        let range = inner.split(body.as_bytes()).ok_or(RocError::BadFormat)?;
        let payload = body
            .narrow(range.start, range.end - range.start)
            .ok_or(RocError::BadFormat)?;

        Ok(RtpView {
            source_id,
            seqnum,
            timestamp,
            duration,
            payload_type,
            marker,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::{NullPayloadComposer, RtpComposer, RtpHeaderFields};
    use roc_packet::pool::{BufferPool, LeakMode, PoisonMode};

    fn pool() -> BufferPool {
        BufferPool::new("test", 4, 256, PoisonMode::Disabled, LeakMode::Ignore)
    }

    #[test]
    fn round_trips_through_composer() {
        let pool = pool();
        let fields = RtpHeaderFields {
            marker: true,
            payload_type: 96,
            seqnum: 777,
            timestamp: 48_000,
            source_id: 0x1234_5678,
        };
        let payload = [7u8; 32];
        let composed =
            RtpComposer::compose(&pool, &fields, &payload, &NullPayloadComposer).unwrap();
        let view = RtpParser::parse(&composed, &NullPayloadParser, 160).unwrap();
        assert_eq!(view.source_id, 0x1234_5678);
        assert_eq!(view.seqnum, 777);
        assert_eq!(view.timestamp, 48_000);
        assert_eq!(view.marker, true);
        assert_eq!(view.payload_type, 96);
        assert_eq!(view.duration, 160);
        assert_eq!(view.payload.as_bytes(), &payload);
    }

    #[test]
    fn rejects_wrong_version() {
        let pool = pool();
        let mut buf = roc_packet::slice::SliceMut::acquire(&pool).unwrap();
        buf.truncate(RTP_HEADER_LEN);
        buf.as_mut_bytes()[0] = 0b0100_0000; // version = 1
        let slice = buf.freeze();
        assert_eq!(
            RtpParser::parse(&slice, &NullPayloadParser, 160).unwrap_err(),
            RocError::BadFormat
        );
    }

    #[test]
    fn rejects_truncated_header() {
        let pool = pool();
        let mut buf = roc_packet::slice::SliceMut::acquire(&pool).unwrap();
        buf.truncate(4);
        let slice = buf.freeze();
        assert_eq!(
            RtpParser::parse(&slice, &NullPayloadParser, 160).unwrap_err(),
            RocError::BadFormat
        );
    }

    #[test]
    fn rejects_nonzero_csrc_count() {
        let pool = pool();
        let mut buf = roc_packet::slice::SliceMut::acquire(&pool).unwrap();
        buf.truncate(RTP_HEADER_LEN);
        buf.as_mut_bytes()[0] = 0b1000_0001; // version=2, cc=1
        let slice = buf.freeze();
        assert_eq!(
            RtpParser::parse(&slice, &NullPayloadParser, 160).unwrap_err(),
            RocError::BadFormat
        );
    }
}
