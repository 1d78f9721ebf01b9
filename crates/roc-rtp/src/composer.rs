//! # RTP Composer
//!
//! Writes the 12-byte fixed RTP header (version=2, no padding, no
//! extension, cc=0), then delegates payload placement to a nested
//! [`PayloadComposer`] — the FEC footer/header composer when the stream
//! carries FEC, or [`NullPayloadComposer`] for bare RTP.
//!
//! ## Alignment
//!
//! The payload is placed so it starts on an 8-byte boundary. Rather than
//! modeling this as inheritance (design §9), the inner composer reports
//! how many bytes it needs before/after the payload, and the outer
//! composer computes a single origin shift inside the pool buffer that
//! satisfies the alignment once — the inner composer never has to know
//! about the outer header's size.

use roc_core::RocError;
use roc_packet::pool::BufferPool;
use roc_packet::slice::{Slice, SliceMut};

/// Fixed RTP header size: version/flags/PT (1+1) + seq (2) + timestamp (4)
/// + SSRC (4).
pub const RTP_HEADER_LEN: usize = 12;

/// Alignment, in bytes, that the payload's start address within the
/// composed packet must satisfy.
pub const PAYLOAD_ALIGNMENT: usize = 8;

/// RTP header fields the composer needs in order to write the fixed
/// header. The payload itself is supplied separately and placed by the
/// inner [`PayloadComposer`].
#[derive(Debug, Clone, Copy)]
pub struct RtpHeaderFields {
    pub marker: bool,
    pub payload_type: u8,
    pub seqnum: u16,
    pub timestamp: u32,
    pub source_id: u32,
}

/// The extension point a nested composer implements to place bytes before
/// and/or after the RTP payload (e.g. an FEC repair header, or an FEC
/// source footer).
pub trait PayloadComposer {
    /// Bytes this composer writes immediately before the payload.
    fn prefix_len(&self) -> usize;
    /// Bytes this composer writes immediately after the payload.
    fn suffix_len(&self) -> usize;
    /// Write the prefix. `buf.len() == self.prefix_len()`.
    fn write_prefix(&self, buf: &mut [u8]);
    /// Write the suffix. `buf.len() == self.suffix_len()`.
    fn write_suffix(&self, buf: &mut [u8]);
}

/// The trivial payload composer for bare RTP (no FEC): no prefix, no
/// suffix.
pub struct NullPayloadComposer;

impl PayloadComposer for NullPayloadComposer {
    fn prefix_len(&self) -> usize {
        0
    }
    fn suffix_len(&self) -> usize {
        0
    }
    fn write_prefix(&self, _buf: &mut [u8]) {}
    fn write_suffix(&self, _buf: &mut [u8]) {}
}

/// Composes a complete RTP packet: fixed header + (inner prefix) + payload
/// + (inner suffix), with the payload 8-byte aligned inside the returned
/// slice.
pub struct RtpComposer;

impl RtpComposer {
    /// Compose a packet. `pool`'s buffer size must be large enough to hold
    /// the header, the inner composer's prefix/suffix, the payload, and up
    /// to `PAYLOAD_ALIGNMENT - 1` bytes of alignment slack.
    pub fn compose(
        pool: &BufferPool,
        fields: &RtpHeaderFields,
        payload: &[u8],
        inner: &dyn PayloadComposer,
    ) -> Result<Slice, RocError> {
        let prefix_len = inner.prefix_len();
        let suffix_len = inner.suffix_len();
        let payload_offset_from_header = RTP_HEADER_LEN + prefix_len;
        let total_len = RTP_HEADER_LEN + prefix_len + payload.len() + suffix_len;

        if total_len + PAYLOAD_ALIGNMENT > pool.buf_size() {
            return Err(RocError::WouldTruncate);
        }

        let mut buf = SliceMut::acquire(pool)?;
        // The innermost composer's alignment requirement is satisfied by
        // shifting the whole packet's origin within the oversized pool
        // buffer, rather than by the outer composer reasoning about the
        // inner composer's internal layout.
        let shift = (PAYLOAD_ALIGNMENT - (payload_offset_from_header % PAYLOAD_ALIGNMENT))
            % PAYLOAD_ALIGNMENT;
        buf.truncate(shift + total_len);

        {
            let raw = buf.as_mut_bytes();
            let raw = &mut raw[shift..];

            write_fixed_header(&mut raw[..RTP_HEADER_LEN], fields);
            let after_header = &mut raw[RTP_HEADER_LEN..];
            inner.write_prefix(&mut after_header[..prefix_len]);
            let after_prefix = &mut after_header[prefix_len..];
            after_prefix[..payload.len()].copy_from_slice(payload);
            let after_payload = &mut after_prefix[payload.len()..];
            inner.write_suffix(&mut after_payload[..suffix_len]);
        }

        let frozen = buf.freeze();
        frozen
            .narrow(shift, total_len)
            .ok_or(RocError::WouldTruncate)
    }
}

fn write_fixed_header(buf: &mut [u8], fields: &RtpHeaderFields) {
    debug_assert_eq!(buf.len(), RTP_HEADER_LEN);
    // V=2, P=0, X=0, CC=0
    buf[0] = 0b1000_0000;
    buf[1] = ((fields.marker as u8) << 7) | (fields.payload_type & 0x7F);
    buf[2..4].copy_from_slice(&fields.seqnum.to_be_bytes());
    buf[4..8].copy_from_slice(&fields.timestamp.to_be_bytes());
    buf[8..12].copy_from_slice(&fields.source_id.to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use roc_packet::pool::{LeakMode, PoisonMode};

    fn pool() -> BufferPool {
        BufferPool::new("test", 4, 256, PoisonMode::Disabled, LeakMode::Ignore)
    }

    #[test]
    fn bare_rtp_payload_is_aligned_and_intact() {
        let pool = pool();
        let fields = RtpHeaderFields {
            marker: true,
            payload_type: 96,
            seqnum: 42,
            timestamp: 12345,
            source_id: 0xdead_beef,
        };
        let payload = [1u8, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let slice = RtpComposer::compose(&pool, &fields, &payload, &NullPayloadComposer).unwrap();
        assert_eq!(slice.len(), RTP_HEADER_LEN + payload.len());
        assert_eq!(slice[0], 0b1000_0000);
        assert_eq!(slice[1], 0b1110_0000); // marker=1, pt=96
        assert_eq!(&slice[2..4], &42u16.to_be_bytes());
        assert_eq!(&slice[4..8], &12345u32.to_be_bytes());
        assert_eq!(&slice[8..12], &0xdead_beefu32.to_be_bytes());
        assert_eq!(&slice[12..], &payload);
    }

    struct FixedPayloadComposer {
        prefix: Vec<u8>,
        suffix: Vec<u8>,
    }

    impl PayloadComposer for FixedPayloadComposer {
        fn prefix_len(&self) -> usize {
            self.prefix.len()
        }
        fn suffix_len(&self) -> usize {
            self.suffix.len()
        }
        fn write_prefix(&self, buf: &mut [u8]) {
            buf.copy_from_slice(&self.prefix);
        }
        fn write_suffix(&self, buf: &mut [u8]) {
            buf.copy_from_slice(&self.suffix);
        }
    }

    #[test]
    fn nested_composer_prefix_and_suffix_land_correctly() {
        let pool = pool();
        let fields = RtpHeaderFields {
            marker: false,
            payload_type: 97,
            seqnum: 1,
            timestamp: 0,
            source_id: 1,
        };
        let inner = FixedPayloadComposer {
            prefix: vec![0xAA, 0xBB, 0xCC],
            suffix: vec![0x11, 0x22, 0x33, 0x44, 0x55, 0x66],
        };
        let payload = [9u8; 20];
        let slice = RtpComposer::compose(&pool, &fields, &payload, &inner).unwrap();
        assert_eq!(&slice[12..15], &[0xAA, 0xBB, 0xCC]);
        assert_eq!(&slice[15..35], &payload);
        assert_eq!(&slice[35..41], &[0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let pool = pool();
        let fields = RtpHeaderFields {
            marker: false,
            payload_type: 96,
            seqnum: 0,
            timestamp: 0,
            source_id: 0,
        };
        let payload = vec![0u8; 1000];
        let err = RtpComposer::compose(&pool, &fields, &payload, &NullPayloadComposer).unwrap_err();
        assert_eq!(err, RocError::WouldTruncate);
    }
}
