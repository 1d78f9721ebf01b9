//! # Latency Monitor
//!
//! A PI controller driving the resampler's playback rate scale to hold
//! the jitter buffer's queued depth near a target latency (design
//! §4.11), plus the absolute bounds past which the session is
//! considered out of control and should be reset rather than nudged.

use std::time::Duration;

// Not serde-derived like the other stage configs: `Duration` has no
// `Serialize`/`Deserialize` impl in the `serde` crate itself, and these
// fields are more naturally expressed as millisecond integers on the wire
// than as a `Duration` newtype wrapper.
#[derive(Debug, Clone, Copy)]
pub struct LatencyConfig {
    pub target_latency: Duration,
    pub min_latency: Duration,
    pub max_latency: Duration,
    pub kp: f64,
    pub ki: f64,
}

/// Largest rate adjustment the controller is allowed to apply in either
/// direction; playback rate stays audibly close to nominal.
const MAX_CORRECTION: f64 = 0.05;

pub struct LatencyMonitor {
    config: LatencyConfig,
    integral: f64,
}

impl LatencyMonitor {
    pub fn new(config: LatencyConfig) -> Self {
        LatencyMonitor {
            config,
            integral: 0.0,
        }
    }

    /// Given the currently estimated queued latency and the time elapsed
    /// since the last call, return the playback rate scale to apply (1.0
    /// = nominal rate; >1.0 drains the buffer faster).
    pub fn update(&mut self, current_latency: Duration, dt: Duration) -> f64 {
        let error = current_latency.as_secs_f64() - self.config.target_latency.as_secs_f64();
        self.integral += error * dt.as_secs_f64();
        let correction = self.config.kp * error + self.config.ki * self.integral;
        1.0 + correction.clamp(-MAX_CORRECTION, MAX_CORRECTION)
    }

    pub fn is_out_of_bounds(&self, current_latency: Duration) -> bool {
        current_latency < self.config.min_latency || current_latency > self.config.max_latency
    }
}
