//! # Packet
//!
//! A reference-counted, multi-view packet (design §3). A packet carries a
//! raw byte [`Slice`] plus up to four parsed views selected by a flag
//! bitmap. The backing slice is set exactly once, at construction, via
//! [`PacketBuilder`]; after [`PacketBuilder::build`] the packet is
//! immutable and freely shareable (cloning a [`Packet`] is an `Arc` clone).
//!
//! Ordering between two packets follows design §3: RTP sequence/timestamp
//! comparison (signed-modular) when both packets carry an RTP view,
//! otherwise FEC `(sbn, esi)` lexicographic order.

use std::net::SocketAddr;
use std::sync::Arc;

use roc_core::modular;

use crate::slice::Slice;

/// A minimal bitflags-style macro, used instead of pulling in the
/// `bitflags` crate for a single five-bit set.
macro_rules! bitflags_like {
    (
        $(#[$outer:meta])*
        pub struct $name:ident: $ty:ty {
            $(const $variant:ident = $value:expr;)*
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name($ty);

        impl $name {
            $(pub const $variant: $name = $name($value);)*

            pub const EMPTY: $name = $name(0);

            pub fn contains(self, other: $name) -> bool {
                self.0 & other.0 == other.0
            }

            pub fn insert(&mut self, other: $name) {
                self.0 |= other.0;
            }
        }

        impl std::ops::BitOr for $name {
            type Output = $name;
            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }
    };
}

bitflags_like! {
    /// Which parsed views are present on a packet.
    pub struct Flags: u8 {
        const UDP = 0b0000_0001;
        const RTP = 0b0000_0010;
        const FEC = 0b0000_0100;
        const AUDIO = 0b0000_1000;
        const REPAIR = 0b0001_0000;
    }
}

/// Parsed UDP source/destination address pair.
#[derive(Debug, Clone, Copy)]
pub struct UdpView {
    pub src: SocketAddr,
    pub dst: SocketAddr,
}

/// Parsed RTP header fields plus the payload sub-slice.
#[derive(Debug, Clone)]
pub struct RtpView {
    pub source_id: u32,
    pub seqnum: u16,
    pub timestamp: u32,
    pub duration: u32,
    pub payload_type: u8,
    pub marker: bool,
    pub payload: Slice,
}

/// Parsed FEC header/footer fields plus the payload sub-slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FecScheme {
    Rs8m,
    LdpcStaircase,
}

#[derive(Debug, Clone)]
pub struct FecView {
    pub scheme: FecScheme,
    pub source_block_number: u16,
    pub encoding_symbol_id: u16,
    pub source_block_length: u16,
    pub repair_symbol_count: u16,
    pub payload: Slice,
}

struct PacketInner {
    flags: Flags,
    data: Slice,
    udp: Option<UdpView>,
    rtp: Option<RtpView>,
    fec: Option<FecView>,
}

/// A reference-counted, immutable packet. Cloning is an `Arc` clone.
#[derive(Clone)]
pub struct Packet(Arc<PacketInner>);

impl Packet {
    pub fn flags(&self) -> Flags {
        self.0.flags
    }

    pub fn data(&self) -> &Slice {
        &self.0.data
    }

    pub fn udp(&self) -> Option<&UdpView> {
        self.0.udp.as_ref()
    }

    pub fn rtp(&self) -> Option<&RtpView> {
        self.0.rtp.as_ref()
    }

    pub fn fec(&self) -> Option<&FecView> {
        self.0.fec.as_ref()
    }

    pub fn is_audio(&self) -> bool {
        self.0.flags.contains(Flags::AUDIO)
    }

    pub fn is_repair(&self) -> bool {
        self.0.flags.contains(Flags::REPAIR)
    }

    /// Ordering key used by the jitter buffer and FEC reader (design §3):
    /// RTP order when both sides carry an RTP view, FEC `(sbn, esi)`
    /// lexicographic order otherwise.
    pub fn order_key(&self) -> OrderKey {
        if let Some(rtp) = &self.0.rtp {
            OrderKey::Rtp {
                seqnum: rtp.seqnum,
                timestamp: rtp.timestamp,
            }
        } else if let Some(fec) = &self.0.fec {
            OrderKey::Fec {
                sbn: fec.source_block_number,
                esi: fec.encoding_symbol_id,
            }
        } else {
            OrderKey::Fec { sbn: 0, esi: 0 }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKey {
    Rtp { seqnum: u16, timestamp: u32 },
    Fec { sbn: u16, esi: u16 },
}

impl OrderKey {
    /// `true` if `self` is strictly after `other` in modular order. Mixed
    /// key kinds (one RTP, one FEC) are incomparable and always return
    /// `false`.
    pub fn is_after(&self, other: &OrderKey) -> bool {
        match (self, other) {
            (OrderKey::Rtp { seqnum: a, .. }, OrderKey::Rtp { seqnum: b, .. }) => {
                modular::after_u16(*a, *b)
            }
            (OrderKey::Fec { sbn: sa, esi: ea }, OrderKey::Fec { sbn: sb, esi: eb }) => {
                match modular::cmp_u16(*sa, *sb) {
                    std::cmp::Ordering::Equal => ea > eb,
                    std::cmp::Ordering::Greater => true,
                    std::cmp::Ordering::Less => false,
                }
            }
            _ => false,
        }
    }
}

/// Builds a packet up from its backing slice and parsed views, enforcing
/// "adding a flag twice is a programming error" (design §3) and "once
/// `data` is set it is never reassigned" via the type system: `data` can
/// only be supplied once, to [`PacketBuilder::new`].
pub struct PacketBuilder {
    flags: Flags,
    data: Slice,
    udp: Option<UdpView>,
    rtp: Option<RtpView>,
    fec: Option<FecView>,
}

impl PacketBuilder {
    pub fn new(data: Slice) -> Self {
        PacketBuilder {
            flags: Flags::EMPTY,
            data,
            udp: None,
            rtp: None,
            fec: None,
        }
    }

    pub fn with_udp(mut self, view: UdpView) -> Self {
        assert!(!self.flags.contains(Flags::UDP), "UDP view set twice");
        self.flags.insert(Flags::UDP);
        self.udp = Some(view);
        self
    }

    pub fn with_rtp(mut self, view: RtpView) -> Self {
        assert!(!self.flags.contains(Flags::RTP), "RTP view set twice");
        self.flags.insert(Flags::RTP);
        self.rtp = Some(view);
        self
    }

    pub fn with_fec(mut self, view: FecView) -> Self {
        assert!(!self.flags.contains(Flags::FEC), "FEC view set twice");
        self.flags.insert(Flags::FEC);
        self.fec = Some(view);
        self
    }

    pub fn with_audio_role(mut self) -> Self {
        self.flags.insert(Flags::AUDIO);
        self
    }

    pub fn with_repair_role(mut self) -> Self {
        self.flags.insert(Flags::REPAIR);
        self
    }

    pub fn build(self) -> Packet {
        Packet(Arc::new(PacketInner {
            flags: self.flags,
            data: self.data,
            udp: self.udp,
            rtp: self.rtp,
            fec: self.fec,
        }))
    }
}
