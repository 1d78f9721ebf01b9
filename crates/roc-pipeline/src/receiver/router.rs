//! # Router
//!
//! Demultiplexes arriving packets onto per-stream destinations by the flag
//! bitmap they carry, and — since two independent streams can share one
//! endpoint — by RTP source-id too (design §4.9): each route names the
//! flags a packet must have plus an optional source-id it must match,
//! first match wins. A stream with FEC registers two routes for its
//! source-id — one requiring `AUDIO`, one requiring `FEC | REPAIR` — so
//! source and repair traffic split before either reaches a session, while
//! a second stream sharing the same endpoint registers its own pair under
//! its own source-id and lands on a distinct destination.

use roc_packet::packet::{Flags, Packet};

struct Route<T> {
    required: Flags,
    source_id: Option<u32>,
    target: T,
}

pub struct Router<T> {
    routes: Vec<Route<T>>,
}

impl<T> Router<T> {
    pub fn new() -> Self {
        Router { routes: Vec::new() }
    }

    /// Register a destination for packets carrying (at least) `required`
    /// flags. `source_id` narrows the match to one RTP source-id; `None`
    /// matches any source-id (or a packet with no RTP view at all).
    /// Routes are tried in registration order.
    pub fn add_route(&mut self, required: Flags, source_id: Option<u32>, target: T) {
        self.routes.push(Route {
            required,
            source_id,
            target,
        });
    }

    /// The first registered destination whose required flags are a subset
    /// of the packet's flags and whose source-id (if any) matches the
    /// packet's, or `None` if nothing matches.
    pub fn route(&self, packet: &Packet) -> Option<&T> {
        let source_id = packet.rtp().map(|r| r.source_id);
        self.routes
            .iter()
            .find(|r| {
                packet.flags().contains(r.required)
                    && r.source_id.map_or(true, |want| Some(want) == source_id)
            })
            .map(|r| &r.target)
    }
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Router::new()
    }
}
