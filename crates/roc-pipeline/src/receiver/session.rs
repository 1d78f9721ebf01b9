//! # Session
//!
//! One remote sender's end-to-end receive pipeline: validate, buffer,
//! watch, and pace a single stream from arrival to playable [`Frame`]
//! (design §4.6-§4.12). Mirrors the state-machine shape of a network
//! session — arrivals drive state transitions rather than the session
//! polling for its own liveness — but here the only states are "alive"
//! and "dead", since there is no handshake to track.
//!
//! A stream using RS8M FEC has its own [`roc_fec::FecReader`] here too
//! (design §4.3): every arriving packet, source or repair, is fed to it,
//! and any source payload the reader manages to reconstruct from repair
//! symbols is re-wrapped as a packet and inserted into the jitter buffer
//! just like one that arrived directly.

use std::time::Duration;

use roc_core::RocError;
use roc_fec::reader::RecoveredSymbol;
use roc_fec::{FecReader, Rs8mDecoder};
use roc_packet::packet::{Packet, PacketBuilder, RtpView};
use roc_packet::pool::BufferPool;
use roc_packet::slice::SliceMut;
use roc_rtp::SampleFormat;

use super::jitter_buffer::JitterBuffer;
use super::latency::{LatencyConfig, LatencyMonitor};
use super::resampler::{Quality, Resampler};
use super::validator::{Validator, ValidatorConfig};
use super::watchdog::{Watchdog, WatchdogConfig};
use crate::frame::{Frame, FrameFlags};
use crate::stats::{SessionStats, StatsHandle};

#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub validator: ValidatorConfig,
    pub watchdog: WatchdogConfig,
    pub latency: LatencyConfig,
    pub channel_count: usize,
    pub format: SampleFormat,
    pub resampler_quality: Quality,
    /// Whether this stream uses RS8M FEC. When set, [`Session::accept`]
    /// feeds every arriving packet (source and repair alike) to an
    /// internal [`FecReader`] and reinserts whatever it recovers.
    pub fec_enabled: bool,
}

/// A session is either receiving normally or has been declared dead by
/// its watchdog and is only waiting to be reaped by its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Dead,
}

pub struct Session {
    validator: Validator,
    jitter_buffer: JitterBuffer,
    watchdog: Watchdog,
    latency: LatencyMonitor,
    resampler: Resampler,
    sample_rate: u32,
    state: SessionState,
    rate_scale: f64,
    stats: StatsHandle,
    frames_produced: u64,
    frames_dropped: u64,
    fec: Option<FecReader<Rs8mDecoder>>,
    fec_pool: BufferPool,
    fec_open_sbn: Option<u16>,
    fec_open_base_timestamp: Option<u32>,
}

impl Session {
    pub fn new(config: SessionConfig, sample_rate: u32, pool: BufferPool) -> Self {
        Session {
            validator: Validator::new(config.validator),
            jitter_buffer: JitterBuffer::new(config.channel_count, config.format),
            watchdog: Watchdog::new(config.watchdog),
            latency: LatencyMonitor::new(config.latency),
            resampler: Resampler::new(config.resampler_quality, config.channel_count),
            sample_rate,
            state: SessionState::Active,
            rate_scale: 1.0,
            stats: StatsHandle::new(),
            frames_produced: 0,
            frames_dropped: 0,
            fec: config.fec_enabled.then(|| FecReader::new(Rs8mDecoder::new())),
            fec_pool: pool,
            fec_open_sbn: None,
            fec_open_base_timestamp: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// A cheaply-cloned handle callers can use to read this session's
    /// counters from another thread without touching the audio clock.
    pub fn stats_handle(&self) -> StatsHandle {
        self.stats.clone()
    }

    /// Validate and enqueue an arrived audio (or FEC-tagged) packet. A
    /// rejected packet is simply dropped — the validator never kills a
    /// session by itself, only the watchdog does, once sustained silence
    /// shows up in `produce()`'s output.
    ///
    /// When this session has FEC enabled, every packet — source and
    /// repair alike — is also fed to the [`FecReader`]; any source
    /// payload it manages to reconstruct once its block closes is
    /// reinserted into the jitter buffer as though it had arrived
    /// directly.
    pub fn accept(&mut self, packet: Packet) -> Result<(), RocError> {
        if self.state == SessionState::Dead {
            return Err(RocError::SessionDead);
        }
        let Some(rtp) = packet.rtp() else {
            return Err(RocError::BadFormat);
        };
        self.validator.validate(rtp)?;
        let duration = rtp.duration.max(1);
        let timestamp = rtp.timestamp;

        let (Some(fec_reader), Some(fec_view)) = (self.fec.as_mut(), packet.fec()) else {
            self.jitter_buffer.insert(packet);
            return Ok(());
        };
        let sbn = fec_view.source_block_number;
        let esi = fec_view.encoding_symbol_id;
        let source_block_length = fec_view.source_block_length;
        let repair_symbol_count = fec_view.repair_symbol_count;
        let payload = fec_view.payload.as_bytes().to_vec();
        let is_repair = packet.is_repair();

        // The block about to close (if this arrival closes one) is the
        // one currently tracked as "open", not whatever block this
        // packet itself belongs to — capture its base timestamp before
        // updating our own tracking below.
        let base_for_recovered = self.fec_open_base_timestamp;

        if !is_repair {
            self.jitter_buffer.insert(packet);
        }

        let recovered = fec_reader.push(sbn, esi, source_block_length, repair_symbol_count, is_repair, &payload)?;
        if let Some(base) = base_for_recovered {
            for symbol in &recovered {
                self.reinsert_recovered(symbol, duration, base);
            }
        }

        if self.fec_open_sbn != Some(sbn) {
            self.fec_open_sbn = Some(sbn);
            self.fec_open_base_timestamp = if !is_repair {
                Some(timestamp.wrapping_sub(esi as u32 * duration))
            } else {
                base_for_recovered.map(|base| base.wrapping_add(source_block_length as u32 * duration))
            };
        }
        Ok(())
    }

    /// Rebuild a playable packet from a reconstructed source payload and
    /// hand it to the jitter buffer. `RecoveredSymbol` only carries the
    /// symbol's position within its block, not the original RTP
    /// timestamp, so the session reconstructs it from the block's base
    /// timestamp (learned from the first source packet seen for that
    /// block) plus `encoding_symbol_id * duration`.
    fn reinsert_recovered(&mut self, symbol: &RecoveredSymbol, duration: u32, base_timestamp: u32) {
        let Ok(mut buf) = SliceMut::acquire(&self.fec_pool) else {
            return;
        };
        let n = symbol.payload.len().min(buf.as_mut_bytes().len());
        buf.as_mut_bytes()[..n].copy_from_slice(&symbol.payload[..n]);
        buf.truncate(n);
        let payload = buf.freeze();

        let view = RtpView {
            source_id: 0,
            seqnum: symbol.encoding_symbol_id,
            timestamp: base_timestamp.wrapping_add(symbol.encoding_symbol_id as u32 * duration),
            duration,
            payload_type: 0,
            marker: false,
            payload,
        };
        let packet = PacketBuilder::new(view.payload.clone())
            .with_rtp(view)
            .with_audio_role()
            .build();
        self.jitter_buffer.insert(packet);
    }

    /// Advance the pipeline by one audio-clock tick: pull the next
    /// `n_samples` from the jitter buffer, feed the watchdog, recompute
    /// the resampler rate scale from the current queue depth, and hand
    /// the frame's samples to the resampler for
    /// [`Session::pull_resampled`] to draw from.
    pub fn produce(&mut self, dt: Duration) -> Frame {
        let n_samples = ((self.sample_rate as f64) * dt.as_secs_f64()).round().max(1.0) as usize;
        let frame = self.jitter_buffer.read(n_samples);
        self.watchdog.observe(frame.flags());
        if self.watchdog.is_dead() {
            self.state = SessionState::Dead;
        }

        let queued_latency = roc_core::clock::SampleRate(self.sample_rate)
            .duration_of((self.jitter_buffer.depth() * frame.num_frames().max(1)) as u64);
        if self.latency.is_out_of_bounds(queued_latency) {
            self.state = SessionState::Dead;
        }
        self.rate_scale = self.latency.update(queued_latency, dt);
        self.resampler.push_input(frame.samples());

        self.frames_produced += 1;
        if frame.flags().contains(FrameFlags::DROPPED) {
            self.frames_dropped += 1;
        }
        self.stats.publish(SessionStats {
            frames_produced: self.frames_produced,
            frames_dropped: self.frames_dropped,
            queued_latency_ms: queued_latency.as_secs_f64() * 1000.0,
            rate_scale: self.rate_scale,
        });

        frame
    }

    /// Draw one resampled output sample-frame at the rate scale last
    /// computed by [`Session::produce`]. `false` means not enough input
    /// is buffered yet to filter this position.
    pub fn pull_resampled(&mut self, out: &mut [f32]) -> bool {
        self.resampler.next_frame(self.rate_scale, out)
    }

    pub fn is_dead(&self) -> bool {
        self.state == SessionState::Dead
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roc_fec::rs8m::Rs8mEncoder;
    use roc_fec::writer::FecWriter;
    use roc_packet::packet::{FecScheme, FecView, PacketBuilder, RtpView};
    use roc_packet::pool::{BufferPool, LeakMode, PoisonMode};
    use roc_packet::slice::SliceMut;
    use roc_rtp::PcmWriter;

    fn pool() -> BufferPool {
        BufferPool::new("test", 16, 256, PoisonMode::Disabled, LeakMode::Ignore)
    }

    fn config() -> SessionConfig {
        SessionConfig {
            validator: ValidatorConfig {
                max_sn_jump: 100,
                max_ts_jump: 16_000,
            },
            watchdog: WatchdogConfig {
                no_playback_timeout_frames: 5,
            },
            latency: LatencyConfig {
                target_latency: Duration::from_millis(100),
                min_latency: Duration::from_millis(1),
                max_latency: Duration::from_secs(5),
                kp: 0.5,
                ki: 0.01,
            },
            channel_count: 1,
            format: SampleFormat::Float32Be,
            resampler_quality: Quality::Low,
            fec_enabled: false,
        }
    }

    fn audio_packet(seqnum: u16, timestamp: u32, source_id: u32) -> Packet {
        let pool = pool();
        let payload = SliceMut::acquire(&pool).unwrap().freeze();
        let view = RtpView {
            source_id,
            seqnum,
            timestamp,
            duration: 4,
            payload_type: 96,
            marker: false,
            payload,
        };
        PacketBuilder::new(SliceMut::acquire(&pool).unwrap().freeze())
            .with_rtp(view)
            .with_audio_role()
            .build()
    }

    fn pcm_payload(pool: &BufferPool, value: f32, frames: u32) -> roc_packet::slice::Slice {
        let mut m = SliceMut::acquire(pool).unwrap();
        let written = {
            let mut writer = PcmWriter::begin(SampleFormat::Float32Be, 1, m.as_mut_bytes());
            for _ in 0..frames {
                writer.write_frame(&[value]);
            }
            writer.end()
        };
        m.truncate(written);
        m.freeze()
    }

    fn fec_packet(
        pool: &BufferPool,
        sbn: u16,
        esi: u16,
        source_block_length: u16,
        repair_symbol_count: u16,
        is_repair: bool,
        timestamp: u32,
        duration: u32,
        payload: roc_packet::slice::Slice,
    ) -> Packet {
        let view = RtpView {
            source_id: 1,
            seqnum: esi,
            timestamp,
            duration,
            payload_type: 96,
            marker: false,
            payload: payload.clone(),
        };
        let fec = FecView {
            scheme: FecScheme::Rs8m,
            source_block_number: sbn,
            encoding_symbol_id: esi,
            source_block_length,
            repair_symbol_count,
            payload,
        };
        let mut b = PacketBuilder::new(SliceMut::acquire(pool).unwrap().freeze())
            .with_rtp(view)
            .with_fec(fec);
        b = if is_repair { b.with_repair_role() } else { b.with_audio_role() };
        b.build()
    }

    #[test]
    fn accepts_matching_packets_and_stays_active() {
        let mut s = Session::new(config(), 16_000, pool());
        assert!(s.accept(audio_packet(0, 0, 7)).is_ok());
        assert_eq!(s.state(), SessionState::Active);
    }

    #[test]
    fn identity_change_is_dropped_but_does_not_kill_the_session() {
        let mut s = Session::new(config(), 16_000, pool());
        s.accept(audio_packet(0, 0, 7)).unwrap();
        let result = s.accept(audio_packet(1, 4, 99));
        assert_eq!(result.unwrap_err(), RocError::BadFormat);
        assert!(!s.is_dead());
    }

    #[test]
    fn sustained_silence_trips_the_watchdog() {
        let mut s = Session::new(config(), 16_000, pool());
        for _ in 0..6 {
            s.produce(Duration::from_millis(10));
        }
        assert!(s.is_dead());
    }

    /// Spec §8 scenario 2: one source packet in an RS8M block is lost but
    /// stays within the repair budget — the session's FEC reader
    /// reconstructs it and the jitter buffer plays out full-signal audio
    /// with no gap.
    #[test]
    fn partial_source_loss_within_fec_budget_is_recovered() {
        let pool = pool();
        let k = 4;
        let m = 1;
        let payload_size = 4;
        let mut writer = FecWriter::new(Rs8mEncoder::new(), k, m);

        let sources: Vec<roc_packet::slice::Slice> = (0..k)
            .map(|i| pcm_payload(&pool, 0.1 * (i as f32 + 1.0), payload_size as u32 / 4))
            .collect();
        let mut tags = Vec::new();
        let mut repairs = Vec::new();
        for src in &sources {
            let (tag, reps) = writer.write(src.as_bytes()).unwrap();
            tags.push(tag);
            if !reps.is_empty() {
                repairs = reps;
            }
        }

        let mut cfg = config();
        cfg.fec_enabled = true;
        let mut s = Session::new(cfg, 16_000, pool.clone());

        let duration = 1u32;
        // Packet for esi=2 is dropped; everything else, including the
        // repair symbol, arrives.
        for (i, tag) in tags.iter().enumerate() {
            if i == 2 {
                continue;
            }
            let packet = fec_packet(
                &pool,
                tag.source_block_number,
                tag.encoding_symbol_id,
                tag.source_block_length,
                m as u16,
                false,
                i as u32 * duration,
                duration,
                sources[i].clone(),
            );
            s.accept(packet).unwrap();
        }
        for rep in &repairs {
            let payload = {
                let mut b = SliceMut::acquire(&pool).unwrap();
                b.as_mut_bytes()[..rep.payload.len()].copy_from_slice(&rep.payload);
                b.truncate(rep.payload.len());
                b.freeze()
            };
            let packet = fec_packet(
                &pool,
                rep.source_block_number,
                rep.encoding_symbol_id,
                rep.source_block_length,
                rep.repair_symbol_count,
                true,
                2 * duration,
                duration,
                payload,
            );
            s.accept(packet).unwrap();
        }

        // The next block's first source packet closes block 0 and
        // triggers recovery.
        let next_block_payload = pcm_payload(&pool, 0.9, 1);
        let closing = fec_packet(&pool, 1, 0, k as u16, m as u16, false, k as u32, duration, next_block_payload);
        s.accept(closing).unwrap();

        let mut saw_recovered = false;
        for _ in 0..(k + 1) {
            let frame = s.produce(Duration::from_micros(62));
            if frame.flags().contains(FrameFlags::HAS_SIGNAL) && !frame.flags().contains(FrameFlags::DROPPED) {
                saw_recovered = true;
            }
        }
        assert!(saw_recovered, "recovered source symbol should play out as real signal");
    }
}
