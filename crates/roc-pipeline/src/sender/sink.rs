//! # Sender Sink
//!
//! Composes a stream's full send-side chain (design §2, §9 pipeline
//! "packetizer → interleaver → FEC writer → UDP writer"): PCM-encode and
//! RTP-compose each frame via [`Packetizer`], optionally tag and protect
//! it with an RS8M [`FecWriter`], and spread the source stream across a
//! block via [`Interleaver`] before it's handed to the transport. Repair
//! packets bypass the interleaver — they are already redundancy against
//! loss in the source stream, interleaving them too would only delay
//! them without buying anything.

use roc_core::RocError;
use roc_fec::rs8m::{Rs8mFooter, Rs8mFooterParser};
use roc_fec::writer::FecWriter;
use roc_fec::Rs8mEncoder;
use roc_packet::packet::{Packet, PacketBuilder};
use roc_packet::pool::BufferPool;
use roc_rtp::{NullPayloadComposer, NullPayloadParser, RtpComposer, RtpHeaderFields, RtpParser};

use super::interleaver::Interleaver;
use super::packetizer::{Packetizer, PacketizerConfig};

/// RS8M protection parameters for a [`SenderSink`]. `source_count` must
/// match the interleaver's block size — both describe the same block.
#[derive(Debug, Clone, Copy)]
pub struct FecConfig {
    pub source_count: usize,
    pub repair_count: usize,
}

struct RepairComposer {
    pool: BufferPool,
    payload_type: u8,
    source_id: u32,
    seqnum: u16,
}

impl RepairComposer {
    fn compose(&mut self, footer: Rs8mFooter, duration: u32, payload: &[u8]) -> Result<Packet, RocError> {
        let fields = RtpHeaderFields {
            marker: false,
            payload_type: self.payload_type,
            seqnum: self.seqnum,
            timestamp: 0,
            source_id: self.source_id,
        };
        let composed = RtpComposer::compose(&self.pool, &fields, payload, &footer)?;
        let view = RtpParser::parse(&composed, &Rs8mFooterParser, duration)?;
        self.seqnum = self.seqnum.wrapping_add(1);
        Ok(PacketBuilder::new(composed).with_rtp(view).with_repair_role().build())
    }
}

struct FecState {
    writer: FecWriter<Rs8mEncoder>,
    repair_composer: RepairComposer,
    duration: u32,
    repair_count: u8,
}

pub struct SenderSink {
    packetizer: Packetizer,
    interleaver: Interleaver,
    fec: Option<FecState>,
}

impl SenderSink {
    /// A sink with no FEC: every frame is packetized, interleaved, and
    /// handed back ready to send.
    pub fn new(pool: BufferPool, config: PacketizerConfig, interleave_block: usize) -> Self {
        let permutation = super::interleaver::default_permutation(interleave_block);
        SenderSink {
            packetizer: Packetizer::new(pool, config),
            interleaver: Interleaver::new(permutation),
            fec: None,
        }
    }

    /// A sink protected by RS8M: `fec.source_count` must equal
    /// `interleave_block`, since the FEC block and the interleaver block
    /// are the same span of the source stream.
    pub fn with_fec(pool: BufferPool, config: PacketizerConfig, fec: FecConfig) -> Self {
        let permutation = super::interleaver::default_permutation(fec.source_count);
        let repair_composer = RepairComposer {
            pool: pool.clone(),
            payload_type: config.payload_type,
            source_id: config.source_id,
            seqnum: 0,
        };
        SenderSink {
            packetizer: Packetizer::new(pool, config),
            interleaver: Interleaver::new(permutation),
            fec: Some(FecState {
                writer: FecWriter::new(Rs8mEncoder::new(), fec.source_count, fec.repair_count),
                repair_composer,
                duration: config.samples_per_packet as u32,
                repair_count: fec.repair_count as u8,
            }),
        }
    }

    /// Packetize one frame and run it through the FEC writer (if
    /// enabled) and the interleaver. Returns every packet ready to send
    /// right now: zero or more source packets (interleaving holds most
    /// of a block back) plus, when this frame closed an FEC block, that
    /// block's repair packets.
    pub fn send_frame(&mut self, samples: &[f32], marker: bool) -> Result<Vec<Packet>, RocError> {
        let payload = self.packetizer.encode(samples);

        let Some(fec) = self.fec.as_mut() else {
            let packet = self.packetizer.compose(&payload, marker, &NullPayloadComposer, &NullPayloadParser)?;
            return Ok(self.interleaver.push(packet));
        };

        let (tag, repairs) = fec.writer.write(&payload)?;
        let footer = Rs8mFooter {
            source_block_number: tag.source_block_number,
            source_block_length: tag.source_block_length,
            encoding_symbol_id: tag.encoding_symbol_id as u8,
            repair_symbol_count: fec.repair_count,
        };
        let source_packet = self.packetizer.compose(&payload, marker, &footer, &Rs8mFooterParser)?;
        let mut out = self.interleaver.push(source_packet);

        for repair in repairs {
            let footer = Rs8mFooter {
                source_block_number: repair.source_block_number,
                source_block_length: repair.source_block_length,
                encoding_symbol_id: repair.encoding_symbol_id as u8,
                repair_symbol_count: repair.repair_symbol_count as u8,
            };
            out.push(fec.repair_composer.compose(footer, fec.duration, &repair.payload)?);
        }
        Ok(out)
    }

    /// Force the interleaver's current (partial) block out in stream
    /// order, and close the FEC writer's current block early. Used at
    /// stream teardown so the last few frames aren't lost waiting for a
    /// block that will never fill.
    pub fn flush(&mut self) -> Result<Vec<Packet>, RocError> {
        let mut out = self.interleaver.flush();
        if let Some(fec) = self.fec.as_mut() {
            for repair in fec.writer.flush()? {
                let footer = Rs8mFooter {
                    source_block_number: repair.source_block_number,
                    source_block_length: repair.source_block_length,
                    encoding_symbol_id: repair.encoding_symbol_id as u8,
                    repair_symbol_count: repair.repair_symbol_count as u8,
                };
                out.push(fec.repair_composer.compose(footer, fec.duration, &repair.payload)?);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roc_packet::pool::{LeakMode, PoisonMode};
    use roc_rtp::SampleFormat;

    fn pool() -> BufferPool {
        BufferPool::new("test", 32, 256, PoisonMode::Disabled, LeakMode::Ignore)
    }

    fn config() -> PacketizerConfig {
        PacketizerConfig {
            payload_type: 96,
            source_id: 0xAA,
            channel_count: 1,
            samples_per_packet: 4,
            format: SampleFormat::Float32Be,
        }
    }

    #[test]
    fn plain_sink_interleaves_without_fec() {
        let mut sink = SenderSink::new(pool(), config(), 4);
        let mut sent = 0;
        for _ in 0..3 {
            sent += sink.send_frame(&[0.0; 4], false).unwrap().len();
        }
        assert_eq!(sent, 0, "first three of a four-block all buffer in the interleaver");
        sent += sink.send_frame(&[0.0; 4], false).unwrap().len();
        assert_eq!(sent, 4);
    }

    #[test]
    fn fec_sink_emits_repairs_once_block_closes() {
        let fec = FecConfig {
            source_count: 4,
            repair_count: 2,
        };
        let mut sink = SenderSink::with_fec(pool(), config(), fec);
        let mut all = Vec::new();
        for _ in 0..4 {
            all.extend(sink.send_frame(&[0.1; 4], false).unwrap());
        }
        let repair_count = all.iter().filter(|p| p.is_repair()).count();
        let source_count = all.iter().filter(|p| !p.is_repair()).count();
        assert_eq!(source_count, 4);
        assert_eq!(repair_count, 2);
    }
}
