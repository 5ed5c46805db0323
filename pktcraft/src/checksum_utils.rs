//! Provide utility functions for calculating the TCP checksum.
//!
//! The sums returned by [`sum16`] and [`pseudo_header_sum`] are not folded, so
//! that several byte ranges can be added up before a single [`fold`].

use std::net::Ipv4Addr;

use byteorder::{ByteOrder, NetworkEndian};

use crate::ipv4::IpProtocol;

/// Sum `data` as a sequence of 16-bit big-endian words, without carry folding.
///
/// An odd trailing byte is the high-order byte of a zero-padded word. The
/// 32-bit accumulator holds the sum of any range up to 128KB, which covers
/// every TCP segment.
pub fn sum16(mut data: &[u8]) -> u32 {
    let mut accum = 0;

    // For each 32-byte chunk...
    const CHUNK_SIZE: usize = 32;
    while data.len() >= CHUNK_SIZE {
        let mut d = &data[..CHUNK_SIZE];
        // ... take by 2 bytes and sum them.
        while d.len() >= 2 {
            accum += NetworkEndian::read_u16(d) as u32;
            d = &d[2..];
        }

        data = &data[CHUNK_SIZE..];
    }

    while data.len() >= 2 {
        accum += NetworkEndian::read_u16(data) as u32;
        data = &data[2..];
    }

    if let Some(&value) = data.first() {
        accum += (value as u32) << 8;
    }

    accum
}

/// Sum the IPv4 pseudo-header of a TCP segment, without carry folding.
///
/// `segment_len` is the length of the whole segment: header, options and
/// payload.
pub fn pseudo_header_sum(src_addr: Ipv4Addr, dst_addr: Ipv4Addr, segment_len: u16) -> u32 {
    sum16(&src_addr.octets())
        + sum16(&dst_addr.octets())
        + u32::from(IpProtocol::TCP.raw())
        + u32::from(segment_len)
}

/// Fold the carries of a 32-bit sum back into its low 16 bits.
pub fn fold(mut sum: u32) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    sum as u16
}

/// Check the checksum of a serialized TCP segment carried over IPv4.
///
/// Summing a segment that holds a correct checksum together with its
/// pseudo-header yields `0xffff`.
pub fn verify_ipv4(src_addr: Ipv4Addr, dst_addr: Ipv4Addr, segment: &[u8]) -> bool {
    let Ok(segment_len) = u16::try_from(segment.len()) else {
        return false;
    };
    fold(pseudo_header_sum(src_addr, dst_addr, segment_len) + sum16(segment)) == 0xffff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc1071_example() {
        let data = [0x00, 0x01, 0xf2, 0x03, 0xf4, 0xf5, 0xf6, 0xf7];
        assert_eq!(sum16(&data[..]), 0x2ddf0);
        assert_eq!(fold(sum16(&data[..])), 0xddf2);
    }

    #[test]
    fn odd_trailing_byte() {
        assert_eq!(sum16(&[0x12]), 0x1200);
        assert_eq!(sum16(&[0xab, 0xcd, 0xef]), 0xabcd + 0xef00);
        assert_eq!(sum16(&[]), 0);
    }

    #[test]
    fn long_range_matches_word_sum() {
        let data: Vec<u8> = (0..=255u8).cycle().take(1001).collect();
        let expected: u32 = data
            .chunks(2)
            .map(|w| {
                let lo = w.get(1).copied().unwrap_or(0);
                u32::from(u16::from_be_bytes([w[0], lo]))
            })
            .sum();
        assert_eq!(sum16(&data[..]), expected);
    }

    #[test]
    fn pseudo_header() {
        let sum = pseudo_header_sum(Ipv4Addr::new(1, 2, 3, 4), Ipv4Addr::new(5, 6, 7, 8), 20);
        assert_eq!(sum, 0x0102 + 0x0304 + 0x0506 + 0x0708 + 6 + 20);
    }

    #[test]
    fn fold_repeats_until_no_carry() {
        assert_eq!(fold(0xffff), 0xffff);
        assert_eq!(fold(0x1_0000), 0x0001);
        // The first fold produces a new carry.
        assert_eq!(fold(0xffff_ffff), 0xffff);
        assert_eq!(fold(0x2_fffe), 0x0001);
    }
}
