//! # Default Tracing Setup
//!
//! An optional, idempotent convenience for binaries or tests embedding
//! this workspace that don't want to wire up their own `tracing`
//! subscriber: installs an env-filter-based one, once, only if the host
//! application hasn't already installed its own.

use std::sync::Once;

/// Install a default `tracing` subscriber if none is set yet. Controlled
/// by `RUST_LOG` (falls back to `warn`). Safe to call more than once —
/// later calls are no-ops.
pub fn init_default_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        if tracing::dispatcher::has_been_set() {
            return;
        }
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_target(true)
            .with_thread_names(true)
            .compact()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
