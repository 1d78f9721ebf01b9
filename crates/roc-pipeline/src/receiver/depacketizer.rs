//! # Depacketizer
//!
//! Decodes one arrived packet's payload back into a [`Frame`] (design
//! §4.7). Kept separate from [`super::jitter_buffer`] so the buffer's
//! ordering/timing logic never has to know the wire sample format.

use roc_packet::packet::RtpView;
use roc_rtp::{PcmReader, SampleFormat};

use crate::frame::{Frame, FrameFlags};

/// Decode `view`'s payload into a fully-signalled [`Frame`].
pub fn decode(view: &RtpView, channel_count: usize, format: SampleFormat) -> Frame {
    let bytes = view.payload.as_bytes();
    let mut reader = PcmReader::begin(format, channel_count, bytes);
    let mut samples = Vec::with_capacity(reader.frames_remaining() * channel_count);
    let mut frame_buf = vec![0.0f32; channel_count];
    while reader.read_frame(&mut frame_buf) {
        samples.extend_from_slice(&frame_buf);
    }
    reader.end();
    Frame::new(samples, channel_count, FrameFlags::HAS_SIGNAL)
}
