//! # Mixer
//!
//! Sums every active session's frame into one output frame (design
//! §4.13). With zero sessions producing output the mixer emits silence
//! flagged `EMPTY`; a capture timestamp only ever survives onto the
//! output when exactly one session contributed, since averaging two
//! different capture times would be meaningless.

use crate::frame::{Frame, FrameFlags};

pub struct Mixer {
    channel_count: usize,
}

impl Mixer {
    pub fn new(channel_count: usize) -> Self {
        Mixer { channel_count }
    }

    pub fn mix(&self, frames: &[Frame]) -> Frame {
        if frames.is_empty() {
            let mut f = Frame::silence(0, self.channel_count);
            f.set_flags(FrameFlags::EMPTY);
            return f;
        }

        let num_frames = frames[0].num_frames();
        let mut out = Frame::new(
            vec![0.0; num_frames * self.channel_count],
            self.channel_count,
            FrameFlags::NONE,
        );
        for frame in frames {
            out.accumulate(frame);
        }
        if frames.len() == 1 {
            if let Some(cts) = frames[0].capture_timestamp() {
                out.set_capture_timestamp(cts);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_sessions_yields_empty_silence() {
        let mixer = Mixer::new(2);
        let out = mixer.mix(&[]);
        assert!(out.flags().contains(FrameFlags::EMPTY));
        assert_eq!(out.num_frames(), 0);
    }

    #[test]
    fn sums_multiple_sessions() {
        let mixer = Mixer::new(1);
        let a = Frame::new(vec![0.2, 0.2], 1, FrameFlags::HAS_SIGNAL);
        let b = Frame::new(vec![0.1, 0.1], 1, FrameFlags::HAS_SIGNAL);
        let out = mixer.mix(&[a, b]);
        assert!((out.samples()[0] - 0.3).abs() < 1e-6);
        assert!(out.flags().contains(FrameFlags::HAS_SIGNAL));
    }

    #[test]
    fn capture_timestamp_only_propagates_with_a_single_session() {
        use roc_core::clock::Instant;
        let mixer = Mixer::new(1);
        let mut a = Frame::new(vec![0.1], 1, FrameFlags::HAS_SIGNAL);
        a.set_capture_timestamp(Instant::now());
        let out = mixer.mix(&[a.clone()]);
        assert!(out.capture_timestamp().is_some());

        let b = Frame::new(vec![0.1], 1, FrameFlags::HAS_SIGNAL);
        let out2 = mixer.mix(&[a, b]);
        assert!(out2.capture_timestamp().is_none());
    }
}
