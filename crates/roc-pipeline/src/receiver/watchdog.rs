//! # Watchdog
//!
//! Declares a session dead once it has gone too long without delivering
//! real signal (design §4.11, resolving the repair-only-session open
//! question): a frame only resets the counter if it carries
//! [`FrameFlags::HAS_SIGNAL`], which the depacketizer sets for both
//! directly-arrived and FEC-reconstructed packets alike — a session
//! fed purely by repair traffic the decoder can never resolve into a
//! source frame still trips the watchdog, because nothing it produces
//! ever carries `HAS_SIGNAL`.

use crate::frame::FrameFlags;

#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct WatchdogConfig {
    /// Number of consecutive no-signal frames tolerated before the
    /// session is declared dead.
    pub no_playback_timeout_frames: usize,
}

pub struct Watchdog {
    config: WatchdogConfig,
    frames_since_signal: usize,
    dead: bool,
}

impl Watchdog {
    pub fn new(config: WatchdogConfig) -> Self {
        Watchdog {
            config,
            frames_since_signal: 0,
            dead: false,
        }
    }

    /// Feed the flags of the frame just produced for this session.
    pub fn observe(&mut self, flags: FrameFlags) {
        if flags.contains(FrameFlags::HAS_SIGNAL) {
            self.frames_since_signal = 0;
        } else {
            self.frames_since_signal += 1;
            if self.frames_since_signal >= self.config.no_playback_timeout_frames {
                self.dead = true;
            }
        }
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_resets_the_counter() {
        let mut w = Watchdog::new(WatchdogConfig {
            no_playback_timeout_frames: 3,
        });
        w.observe(FrameFlags::NONE);
        w.observe(FrameFlags::NONE);
        w.observe(FrameFlags::HAS_SIGNAL);
        w.observe(FrameFlags::NONE);
        assert!(!w.is_dead());
    }

    #[test]
    fn dies_after_sustained_silence() {
        let mut w = Watchdog::new(WatchdogConfig {
            no_playback_timeout_frames: 3,
        });
        for _ in 0..3 {
            w.observe(FrameFlags::EMPTY);
        }
        assert!(w.is_dead());
    }

    #[test]
    fn repair_only_traffic_never_resets_the_watchdog() {
        let mut w = Watchdog::new(WatchdogConfig {
            no_playback_timeout_frames: 2,
        });
        // A session fed only unresolved repair symbols never produces a
        // HAS_SIGNAL frame, so it dies exactly like pure silence would.
        w.observe(FrameFlags::DROPPED);
        w.observe(FrameFlags::DROPPED);
        assert!(w.is_dead());
    }
}
