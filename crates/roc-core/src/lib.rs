//! # roc-core
//!
//! Shared foundations for the Roc streaming core: the error taxonomy (§7 of
//! the design), modular sequence-number/timestamp arithmetic used by the
//! validator, jitter buffer, and FEC reader, and small clock/duration
//! helpers shared across the pipeline crates.
//!
//! ## Crate structure
//!
//! - [`error`] — the `RocError` taxonomy
//! - [`modular`] — signed-modular comparison for wrapping counters
//! - [`clock`] — monotonic clock + sample/duration conversion
//! - [`tracing_init`] — optional default `tracing` subscriber setup

pub mod clock;
pub mod error;
pub mod modular;
pub mod tracing_init;

pub use error::RocError;
pub use tracing_init::init_default_tracing;
