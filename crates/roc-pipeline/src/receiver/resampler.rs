//! # Resampler
//!
//! A windowed-sinc polyphase-style resampler (design §4.12) that tracks
//! a fractional read position into a rolling input buffer, consuming it
//! at whatever rate [`super::latency::LatencyMonitor`] asks for. Three
//! quality tiers trade CPU for passband width by varying the kernel's
//! tap count.

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Quality {
    Low,
    Medium,
    High,
}

impl Quality {
    fn taps(self) -> usize {
        match self {
            Quality::Low => 16,
            Quality::Medium => 32,
            Quality::High => 64,
        }
    }
}

fn build_kernel(taps: usize) -> Vec<f64> {
    let n = taps;
    let mut kernel: Vec<f64> = (0..n)
        .map(|i| {
            let x = i as f64 - (n as f64 - 1.0) / 2.0;
            let sinc = if x.abs() < 1e-12 {
                1.0
            } else {
                (std::f64::consts::PI * x).sin() / (std::f64::consts::PI * x)
            };
            let window =
                0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / (n as f64 - 1.0)).cos();
            sinc * window
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    if sum.abs() > 1e-12 {
        for w in kernel.iter_mut() {
            *w /= sum;
        }
    }
    kernel
}

pub struct Resampler {
    channel_count: usize,
    kernel: Vec<f64>,
    input: Vec<f32>,
    read_pos: f64,
}

impl Resampler {
    pub fn new(quality: Quality, channel_count: usize) -> Self {
        Resampler {
            channel_count,
            kernel: build_kernel(quality.taps()),
            input: Vec::new(),
            read_pos: 0.0,
        }
    }

    /// Append interleaved samples to the rolling input buffer.
    pub fn push_input(&mut self, samples: &[f32]) {
        self.input.extend_from_slice(samples);
    }

    /// Produce one interleaved output sample-frame at the current
    /// fractional read position into `out` (length `channel_count`),
    /// then advance the cursor by `scale` input frames. Returns `false`
    /// if there isn't enough input buffered to filter this position yet.
    pub fn next_frame(&mut self, scale: f64, out: &mut [f32]) -> bool {
        debug_assert_eq!(out.len(), self.channel_count);
        let taps = self.kernel.len() as isize;
        let num_frames = (self.input.len() / self.channel_count.max(1)) as isize;
        let base = self.read_pos.floor() as isize;
        if base + taps / 2 + 1 >= num_frames {
            return false;
        }

        for ch in 0..self.channel_count {
            let mut acc = 0.0f64;
            for (k, &w) in self.kernel.iter().enumerate() {
                let idx = base - taps / 2 + k as isize;
                if idx >= 0 && idx < num_frames {
                    acc += self.input[idx as usize * self.channel_count + ch] as f64 * w;
                }
            }
            out[ch] = acc as f32;
        }

        self.read_pos += scale;
        let half = taps as f64 / 2.0;
        let consumable = (self.read_pos - half).max(0.0) as usize;
        if consumable > 0 && self.channel_count > 0 {
            let drop = consumable.min(self.input.len() / self.channel_count);
            self.input.drain(0..drop * self.channel_count);
            self.read_pos -= drop as f64;
        }
        true
    }
}
