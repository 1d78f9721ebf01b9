//! # roc-pipeline
//!
//! The sender and receiver audio pipelines built on top of `roc-rtp`
//! and `roc-fec`: packetizer and interleaver on the sender side;
//! router, validator, jitter buffer, watchdog, latency monitor,
//! resampler, and mixer on the receiver side; plus the `Frame`
//! abstraction, network `Endpoint`s, and the control-plane task queue
//! that ties them to the rest of the application (design §4).

pub mod endpoint;
pub mod frame;
pub mod output;
pub mod profiler;
pub mod receiver;
pub mod sender;
pub mod stats;
pub mod task;

pub use endpoint::{Endpoint, EndpointSet, InterfaceKind};
pub use frame::{Frame, FrameFlags};
pub use output::{audio_ring, AudioConsumer, AudioProducer};
pub use profiler::PipelineProfiler;
pub use stats::{SessionStats, StatsHandle};
pub use task::{Task, TaskPipeline, TaskSender};
