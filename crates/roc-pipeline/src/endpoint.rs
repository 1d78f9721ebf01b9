//! # Endpoints
//!
//! A stream's network address is really up to three related addresses:
//! source (audio/RTP), repair (FEC), and control (feedback/session
//! management). [`EndpointSet`] groups whichever of those a given
//! stream actually uses.

use std::net::SocketAddr;

/// Which role an endpoint plays within a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceKind {
    Source,
    Repair,
    Control,
}

#[derive(Debug, Clone, Copy)]
pub struct Endpoint {
    pub interface: InterfaceKind,
    pub address: SocketAddr,
}

/// The set of endpoints making up one stream. A stream with no FEC has
/// only a source endpoint; one with FEC also has a repair endpoint.
#[derive(Debug, Clone, Default)]
pub struct EndpointSet {
    source: Option<Endpoint>,
    repair: Option<Endpoint>,
    control: Option<Endpoint>,
}

impl EndpointSet {
    pub fn new() -> Self {
        EndpointSet::default()
    }

    pub fn with_source(mut self, address: SocketAddr) -> Self {
        self.source = Some(Endpoint {
            interface: InterfaceKind::Source,
            address,
        });
        self
    }

    pub fn with_repair(mut self, address: SocketAddr) -> Self {
        self.repair = Some(Endpoint {
            interface: InterfaceKind::Repair,
            address,
        });
        self
    }

    pub fn with_control(mut self, address: SocketAddr) -> Self {
        self.control = Some(Endpoint {
            interface: InterfaceKind::Control,
            address,
        });
        self
    }

    pub fn source(&self) -> Option<&Endpoint> {
        self.source.as_ref()
    }

    pub fn repair(&self) -> Option<&Endpoint> {
        self.repair.as_ref()
    }

    pub fn control(&self) -> Option<&Endpoint> {
        self.control.as_ref()
    }

    /// Whether this stream carries FEC repair traffic.
    pub fn has_fec(&self) -> bool {
        self.repair.is_some()
    }
}
