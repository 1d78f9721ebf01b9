//! # Pipeline Profiler
//!
//! An opt-in, read-only per-stage timing collector (design §9, carried
//! over from the original implementation's `Profiler`). It never gates
//! behavior — stages call [`PipelineProfiler::record`] unconditionally,
//! and a disabled profiler is a no-op. Each stage keeps a capped rolling
//! window of its most recent durations rather than an unbounded history.

use std::collections::VecDeque;
use std::time::Duration;

use roc_core::clock::Instant;

const WINDOW: usize = 128;

#[derive(Debug, Default)]
struct Stage {
    samples: VecDeque<Duration>,
}

impl Stage {
    fn push(&mut self, d: Duration) {
        if self.samples.len() == WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(d);
    }

    fn mean(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        self.samples.iter().sum::<Duration>() / self.samples.len() as u32
    }

    fn max(&self) -> Duration {
        self.samples.iter().copied().max().unwrap_or(Duration::ZERO)
    }
}

/// A named per-stage timer handle returned by [`PipelineProfiler::start`].
pub struct StageTimer<'a> {
    profiler: &'a PipelineProfiler,
    name: &'static str,
    started: Instant,
}

impl Drop for StageTimer<'_> {
    fn drop(&mut self) {
        self.profiler.record(self.name, self.started.elapsed());
    }
}

#[derive(Default)]
pub struct PipelineProfiler {
    enabled: bool,
    stages: std::sync::Mutex<std::collections::HashMap<&'static str, Stage>>,
}

impl PipelineProfiler {
    pub fn new(enabled: bool) -> Self {
        PipelineProfiler {
            enabled,
            stages: std::sync::Mutex::new(std::collections::HashMap::new()),
        }
    }

    /// Begin timing `name`; the elapsed time is recorded when the
    /// returned guard drops.
    pub fn start(&self, name: &'static str) -> StageTimer<'_> {
        StageTimer {
            profiler: self,
            name,
            started: Instant::now(),
        }
    }

    pub fn record(&self, name: &'static str, duration: Duration) {
        if !self.enabled {
            return;
        }
        let mut stages = self.stages.lock().unwrap();
        stages.entry(name).or_default().push(duration);
    }

    pub fn mean(&self, name: &str) -> Duration {
        self.stages
            .lock()
            .unwrap()
            .get(name)
            .map(Stage::mean)
            .unwrap_or(Duration::ZERO)
    }

    pub fn max(&self, name: &str) -> Duration {
        self.stages
            .lock()
            .unwrap()
            .get(name)
            .map(Stage::max)
            .unwrap_or(Duration::ZERO)
    }
}
