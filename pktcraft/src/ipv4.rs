//! IPv4 protocol.

pub use std::net::Ipv4Addr;

enum_sim! {
    /// An enum-like type for representing different protocols in IPv4.
    pub struct IpProtocol (u8) {
        /// IP packet payload is ICMP protocol.
        ICMP = 1,

        /// IP packet payload is TCP protocol.
        TCP = 6,

        /// IP packet payload is UDP protocol.
        UDP =  17,
    }
}
