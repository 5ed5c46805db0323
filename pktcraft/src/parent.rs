use std::net::{Ipv4Addr, Ipv6Addr};

/// The capability a TCP segment asks of the packet that encloses it.
///
/// The checksum of a TCP segment covers an IPv4 pseudo-header, so a segment
/// can only compute it when its parent hands out the source and destination
/// addresses. Parents that can not do so keep the default implementation.
pub trait PduParent {
    /// Return the `(source, destination)` IPv4 addresses of the parent, or
    /// `None` if the parent is not an IPv4 packet.
    fn ipv4_addrs(&self) -> Option<(Ipv4Addr, Ipv4Addr)> {
        None
    }
}

/// A segment serialized without any enclosing packet.
impl PduParent for () {}

/// The packets that may carry a TCP segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentPdu {
    /// The segment rides inside an IPv4 packet.
    Ipv4 {
        /// Source address of the IPv4 packet.
        src_addr: Ipv4Addr,
        /// Destination address of the IPv4 packet.
        dst_addr: Ipv4Addr,
    },

    /// The segment rides inside an IPv6 packet.
    Ipv6 {
        /// Source address of the IPv6 packet.
        src_addr: Ipv6Addr,
        /// Destination address of the IPv6 packet.
        dst_addr: Ipv6Addr,
    },

    /// The segment is serialized on its own.
    None,
}

impl PduParent for ParentPdu {
    #[inline]
    fn ipv4_addrs(&self) -> Option<(Ipv4Addr, Ipv4Addr)> {
        match *self {
            ParentPdu::Ipv4 { src_addr, dst_addr } => Some((src_addr, dst_addr)),
            // The IPv6 pseudo-header differs, only IPv4 checksums are computed.
            ParentPdu::Ipv6 { .. } | ParentPdu::None => None,
        }
    }
}
