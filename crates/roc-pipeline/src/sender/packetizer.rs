//! # Packetizer
//!
//! Turns one frame's worth of samples into a wire [`Packet`]: encode to
//! the wire sample format, compose the RTP header (and whatever nested
//! FEC footer the stream uses), then re-parse the composed bytes through
//! the matching [`roc_rtp::RtpParser`] so the packet's `RtpView` is
//! derived the same way a receiver would derive it, rather than
//! hand-assembled twice.

use roc_core::RocError;
use roc_packet::packet::{Packet, PacketBuilder};
use roc_packet::pool::BufferPool;
use roc_rtp::{PayloadComposer, PayloadParser, PcmWriter, RtpComposer, RtpHeaderFields, RtpParser, SampleFormat};

#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct PacketizerConfig {
    pub payload_type: u8,
    pub source_id: u32,
    pub channel_count: usize,
    pub samples_per_packet: usize,
    pub format: SampleFormat,
}

pub struct Packetizer {
    config: PacketizerConfig,
    pool: BufferPool,
    seqnum: u16,
    timestamp: u32,
}

impl Packetizer {
    pub fn new(pool: BufferPool, config: PacketizerConfig) -> Self {
        Packetizer {
            config,
            pool,
            seqnum: 0,
            timestamp: 0,
        }
    }

    /// Encode and wrap `samples` (exactly `samples_per_packet *
    /// channel_count` long) as one wire packet, advancing the sequence
    /// number and RTP timestamp.
    pub fn packetize(
        &mut self,
        samples: &[f32],
        marker: bool,
        inner_composer: &dyn PayloadComposer,
        inner_parser: &dyn PayloadParser,
    ) -> Result<Packet, RocError> {
        let payload = self.encode(samples);
        self.compose(&payload, marker, inner_composer, inner_parser)
    }

    /// PCM-encode `samples` to wire bytes without composing an RTP
    /// header around them yet. Split out from [`Packetizer::packetize`]
    /// so a caller that needs the raw payload first — e.g. to hand it to
    /// an FEC block encoder before the RTP/footer framing is known —
    /// doesn't have to encode the same samples twice.
    pub(crate) fn encode(&self, samples: &[f32]) -> Vec<u8> {
        let sample_bytes = self.config.format.bytes_per_sample();
        let payload_capacity = self.config.samples_per_packet * self.config.channel_count * sample_bytes;
        let mut payload_buf = vec![0u8; payload_capacity];
        let mut writer = PcmWriter::begin(self.config.format, self.config.channel_count, &mut payload_buf);
        for frame in samples.chunks(self.config.channel_count) {
            if !writer.write_frame(frame) {
                break;
            }
        }
        let written = writer.end();
        payload_buf.truncate(written);
        payload_buf
    }

    /// Compose an already-PCM-encoded `payload` into one wire packet,
    /// advancing the sequence number and RTP timestamp exactly as
    /// [`Packetizer::packetize`] does.
    pub(crate) fn compose(
        &mut self,
        payload: &[u8],
        marker: bool,
        inner_composer: &dyn PayloadComposer,
        inner_parser: &dyn PayloadParser,
    ) -> Result<Packet, RocError> {
        let fields = RtpHeaderFields {
            marker,
            payload_type: self.config.payload_type,
            seqnum: self.seqnum,
            timestamp: self.timestamp,
            source_id: self.config.source_id,
        };
        let composed = RtpComposer::compose(&self.pool, &fields, payload, inner_composer)?;
        let view = RtpParser::parse(&composed, inner_parser, self.config.samples_per_packet as u32)?;
        let packet = PacketBuilder::new(composed).with_rtp(view).with_audio_role().build();

        self.seqnum = self.seqnum.wrapping_add(1);
        self.timestamp = self
            .timestamp
            .wrapping_add(self.config.samples_per_packet as u32);

        Ok(packet)
    }
}
