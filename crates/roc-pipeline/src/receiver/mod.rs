//! Receiver-side pipeline stages: route, validate, buffer, watch, pace,
//! and mix every active session's audio (design §4.6-§4.13).

pub mod decoder;
pub mod depacketizer;
pub mod jitter_buffer;
pub mod latency;
pub mod mixer;
pub mod resampler;
pub mod router;
pub mod session;
pub mod session_table;
pub mod validator;
pub mod watchdog;

pub use decoder::{decode_bare, decode_rs8m};
pub use jitter_buffer::JitterBuffer;
pub use latency::{LatencyConfig, LatencyMonitor};
pub use mixer::Mixer;
pub use resampler::{Quality, Resampler};
pub use router::Router;
pub use session::{Session, SessionConfig, SessionState};
pub use session_table::SessionTable;
pub use validator::{Validator, ValidatorConfig};
pub use watchdog::{Watchdog, WatchdogConfig};
