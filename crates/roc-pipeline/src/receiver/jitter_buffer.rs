//! # Jitter Buffer
//!
//! Holds arrived audio packets until they're due for playback, in RTP
//! timestamp order, and fills a playback gap with silence rather than
//! blocking (design §4.7-§4.8). Packets that arrive for a position
//! already played out are dropped; a position whose packet never shows
//! up is silence-filled once the buffer's cursor reaches it.
//!
//! `read` takes an explicit sample count rather than always handing back
//! one packet's worth: the caller's output cadence (e.g. a sound-card
//! buffer size) rarely lines up with the wire's `packet_length`, so one
//! `read(n)` call may need to drain the tail of one queued packet, all of
//! the next, and part of a silence gap to fill `n` samples. Packet and
//! gap boundaries are kept transparent to the caller via `pending`, the
//! not-yet-fully-consumed segment left over from the previous call.

use roc_core::modular;
use roc_packet::packet::Packet;
use roc_rtp::SampleFormat;

use super::depacketizer;
use crate::frame::{Frame, FrameFlags};

pub struct JitterBuffer {
    channel_count: usize,
    format: SampleFormat,
    queue: Vec<Packet>,
    next_timestamp: Option<u32>,
    last_duration: u32,
    pending: Option<Frame>,
    pending_offset: usize,
}

impl JitterBuffer {
    pub fn new(channel_count: usize, format: SampleFormat) -> Self {
        JitterBuffer {
            channel_count,
            format,
            queue: Vec::new(),
            next_timestamp: None,
            last_duration: 0,
            pending: None,
            pending_offset: 0,
        }
    }

    /// Insert an arrived audio packet. Silently dropped if it's entirely
    /// in the past (its end falls before the read cursor) or duplicates
    /// a timestamp already queued.
    pub fn insert(&mut self, packet: Packet) {
        let Some(rtp) = packet.rtp() else { return };
        let ts = rtp.timestamp;
        let end = ts.wrapping_add(rtp.duration.max(1));

        match self.next_timestamp {
            Some(next) if !modular::after_u32(end, next) => return,
            None => self.next_timestamp = Some(ts),
            _ => {}
        }
        self.last_duration = self.last_duration.max(rtp.duration);

        let pos = self
            .queue
            .partition_point(|p| !modular::after_u32(p.rtp().unwrap().timestamp, ts));
        if pos > 0 && self.queue[pos - 1].rtp().unwrap().timestamp == ts {
            return;
        }
        self.queue.insert(pos, packet);
    }

    /// Draw `n` samples, advancing the read cursor by exactly `n`. Packet
    /// boundaries are transparent: the returned frame's first samples may
    /// be the tail of a previously-started packet (or gap), its middle
    /// samples a run of whole packets, and its last samples the start of
    /// whatever comes next. Flags are the union of every segment that
    /// contributed a sample.
    pub fn read(&mut self, n_samples: usize) -> Frame {
        if self.next_timestamp.is_none() {
            return Frame::silence(n_samples, self.channel_count);
        }

        let channel_count = self.channel_count.max(1);
        let mut out = vec![0.0f32; n_samples * channel_count];
        let mut flags = FrameFlags::NONE;
        let mut filled = 0usize;

        while filled < n_samples {
            if self.pending.is_none() {
                self.pending = Some(self.pull_segment());
                self.pending_offset = 0;
            }
            let segment_frames = self.pending.as_ref().unwrap().num_frames();
            let remaining = segment_frames - self.pending_offset;
            let take = remaining.min(n_samples - filled);

            if take > 0 {
                let segment = self.pending.as_ref().unwrap();
                let src_start = self.pending_offset * channel_count;
                let src_end = (self.pending_offset + take) * channel_count;
                out[filled * channel_count..(filled + take) * channel_count]
                    .copy_from_slice(&segment.samples()[src_start..src_end]);
                flags = flags | segment.flags();
            }

            self.pending_offset += take;
            filled += take;
            if self.pending_offset >= segment_frames {
                self.pending = None;
            }
        }

        Frame::new(out, self.channel_count, flags)
    }

    /// Pull exactly one packet's (or one silence gap's) worth of decoded
    /// samples and advance `next_timestamp` past it. The unit `read`
    /// stitches together to satisfy an arbitrary `n_samples`.
    fn pull_segment(&mut self) -> Frame {
        let next = self.next_timestamp.expect("caller checked Some");
        if !self.queue.is_empty() && self.queue[0].rtp().unwrap().timestamp == next {
            let packet = self.queue.remove(0);
            let rtp = packet.rtp().unwrap();
            let duration = rtp.duration.max(1);
            let frame = depacketizer::decode(rtp, self.channel_count, self.format);
            self.next_timestamp = Some(next.wrapping_add(duration));
            frame
        } else {
            let duration = self.last_duration.max(1);
            self.next_timestamp = Some(next.wrapping_add(duration));
            let mut frame = Frame::silence(duration as usize, self.channel_count);
            frame.set_flags(FrameFlags::EMPTY | FrameFlags::DROPPED);
            frame
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.queue.len()
    }
}
