//! # Session Table
//!
//! Ties the per-packet [`Router`], per-stream [`Session`], and the
//! cross-session [`Mixer`] together into the receiver side of the
//! pipeline (design §2, §4.9, scenario 6): packets arriving on one shared
//! endpoint are demultiplexed onto a session keyed by RTP source-id —
//! spinning a fresh session up the first time a source-id is seen — and
//! every active session's `produce()` output is summed by the mixer into
//! one frame per audio-clock tick. Two streams that happen to share an
//! endpoint land on two independent sessions and mix to one output,
//! rather than one session's packets corrupting the other's.

use std::collections::HashMap;
use std::time::Duration;

use roc_core::RocError;
use roc_packet::packet::{Flags, Packet};
use roc_packet::pool::BufferPool;

use super::mixer::Mixer;
use super::router::Router;
use super::session::{Session, SessionConfig};
use crate::frame::Frame;

pub struct SessionTable {
    router: Router<u32>,
    sessions: HashMap<u32, Session>,
    mixer: Mixer,
    config: SessionConfig,
    sample_rate: u32,
    pool: BufferPool,
}

impl SessionTable {
    pub fn new(config: SessionConfig, sample_rate: u32, pool: BufferPool) -> Self {
        SessionTable {
            router: Router::new(),
            sessions: HashMap::new(),
            mixer: Mixer::new(config.channel_count),
            config,
            sample_rate,
            pool,
        }
    }

    /// Route an arrived packet onto its session, spinning up a fresh
    /// session and registering its routes the first time its RTP
    /// source-id is seen. A packet whose source-id has never been seen
    /// and that carries no RTP view at all is rejected outright.
    pub fn accept(&mut self, packet: Packet) -> Result<(), RocError> {
        let Some(rtp) = packet.rtp() else {
            return Err(RocError::BadFormat);
        };
        let source_id = rtp.source_id;

        if let std::collections::hash_map::Entry::Vacant(e) = self.sessions.entry(source_id) {
            e.insert(Session::new(self.config, self.sample_rate, self.pool.clone()));
            self.router.add_route(Flags::AUDIO, Some(source_id), source_id);
            self.router.add_route(Flags::FEC, Some(source_id), source_id);
        }

        let Some(&target) = self.router.route(&packet) else {
            return Err(RocError::BadFormat);
        };
        let session = self
            .sessions
            .get_mut(&target)
            .expect("a route's target always names a session already in the table");
        session.accept(packet)
    }

    /// Drop sessions whose watchdog or latency monitor has declared them
    /// dead. The caller decides when to reap (e.g. once per control-plane
    /// tick) rather than this happening implicitly inside `produce`.
    pub fn reap_dead(&mut self) {
        self.sessions.retain(|_, s| !s.is_dead());
    }

    /// Advance every active session by one audio-clock tick and mix
    /// their output into a single frame.
    pub fn produce(&mut self, dt: Duration) -> Frame {
        let frames: Vec<Frame> = self.sessions.values_mut().map(|s| s.produce(dt)).collect();
        self.mixer.mix(&frames)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
