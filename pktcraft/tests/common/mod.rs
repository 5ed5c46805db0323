use std::{fs::File, io::Read};

use pnet::packet::tcp::{ipv4_checksum, TcpPacket};
use pktcraft::ipv4::Ipv4Addr;

pub fn file_to_packet(fname: &str) -> Vec<u8> {
    // The test is executed under the crate root directory.
    let mut program_path = std::env::current_dir().unwrap();
    program_path.push("tests");
    program_path.push("packet_examples");
    program_path.push(fname);

    let mut file = File::open(program_path).unwrap();
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    let content = content.trim();

    (0..content.len())
        .step_by(2)
        .map(|idx| u8::from_str_radix(&content[idx..idx + 2], 16).unwrap())
        .collect()
}

/// The checksum pnet computes for `segment`, skipping its checksum field.
#[allow(dead_code)]
pub fn pnet_checksum(segment: &[u8], src_addr: Ipv4Addr, dst_addr: Ipv4Addr) -> u16 {
    let pkt = TcpPacket::new(segment).unwrap();
    ipv4_checksum(&pkt, &src_addr, &dst_addr)
}

/// A plain RFC1071 checksum over the pseudo-header and `segment` with its
/// checksum field zeroed.
#[allow(dead_code)]
pub fn rfc1071_checksum(segment: &[u8], src_addr: Ipv4Addr, dst_addr: Ipv4Addr) -> u16 {
    let mut stream = Vec::new();
    stream.extend_from_slice(&src_addr.octets());
    stream.extend_from_slice(&dst_addr.octets());
    stream.extend_from_slice(&[0, 6]);
    stream.extend_from_slice(&(segment.len() as u16).to_be_bytes());
    stream.extend_from_slice(segment);
    stream[12 + 16] = 0;
    stream[12 + 17] = 0;
    if stream.len() % 2 == 1 {
        stream.push(0);
    }

    let mut sum: u64 = stream
        .chunks(2)
        .map(|w| u64::from(u16::from_be_bytes([w[0], w[1]])))
        .sum();
    while sum > 0xffff {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    !(sum as u16)
}
