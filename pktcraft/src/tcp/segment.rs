use bytes::BufMut;
use tracing::{debug, trace};

use crate::checksum_utils;
use crate::{PduParent, Result, TcpError};

use super::{OptionKind, TcpFlags, TcpHeader, TcpOptions, TCP_HEADER_LEN, TCP_HEADER_TEMPLATE};

/// The window size of a newly created segment.
pub const DEFAULT_WINDOW: u16 = 32678;

/// A TCP segment under construction.
///
/// The segment owns its header fields and copies of its option data, but only
/// borrows the payload, which must outlive it. The data offset is derived from
/// the options, and the checksum is recomputed by [`TcpSegment::serialize`]
/// whenever the parent packet is IPv4.
#[derive(Debug, Clone)]
pub struct TcpSegment<'a> {
    header: TcpHeader<[u8; TCP_HEADER_LEN]>,
    options: TcpOptions,
    payload: &'a [u8],
}

impl<'a> TcpSegment<'a> {
    /// Create a segment between two ports.
    ///
    /// Sequence and acknowledgment numbers, flags, checksum and urgent pointer
    /// start at zero, the window at [`DEFAULT_WINDOW`].
    pub fn new(src_port: u16, dst_port: u16) -> Self {
        let mut header = TCP_HEADER_TEMPLATE;
        header.set_src_port(src_port);
        header.set_dst_port(dst_port);
        header.set_window_size(DEFAULT_WINDOW);
        Self {
            header,
            options: TcpOptions::new(),
            payload: &[],
        }
    }

    /// The in-memory fixed header.
    ///
    /// Data offset and checksum reflect the last serialization.
    #[inline]
    pub fn header(&self) -> &TcpHeader<[u8; TCP_HEADER_LEN]> {
        &self.header
    }

    #[inline]
    pub fn src_port(&self) -> u16 {
        self.header.src_port()
    }

    #[inline]
    pub fn set_src_port(&mut self, value: u16) {
        self.header.set_src_port(value)
    }

    #[inline]
    pub fn dst_port(&self) -> u16 {
        self.header.dst_port()
    }

    #[inline]
    pub fn set_dst_port(&mut self, value: u16) {
        self.header.set_dst_port(value)
    }

    #[inline]
    pub fn seq_number(&self) -> u32 {
        self.header.seq_number()
    }

    #[inline]
    pub fn set_seq_number(&mut self, value: u32) {
        self.header.set_seq_number(value)
    }

    #[inline]
    pub fn ack_number(&self) -> u32 {
        self.header.ack_number()
    }

    #[inline]
    pub fn set_ack_number(&mut self, value: u32) {
        self.header.set_ack_number(value)
    }

    #[inline]
    pub fn window_size(&self) -> u16 {
        self.header.window_size()
    }

    #[inline]
    pub fn set_window_size(&mut self, value: u16) {
        self.header.set_window_size(value)
    }

    /// The checksum as last set by the caller or computed by `serialize`.
    #[inline]
    pub fn checksum(&self) -> u16 {
        self.header.checksum()
    }

    /// Set the checksum written when the parent offers no IPv4 addresses.
    #[inline]
    pub fn set_checksum(&mut self, value: u16) {
        self.header.set_checksum(value)
    }

    #[inline]
    pub fn urgent_ptr(&self) -> u16 {
        self.header.urgent_ptr()
    }

    #[inline]
    pub fn set_urgent_ptr(&mut self, value: u16) {
        self.header.set_urgent_ptr(value)
    }

    #[inline]
    pub fn flags(&self) -> TcpFlags {
        self.header.flags()
    }

    #[inline]
    pub fn set_flags(&mut self, flags: TcpFlags) {
        self.header.set_flags(flags)
    }

    #[inline]
    pub fn flag(&self, flag: TcpFlags) -> bool {
        self.header.flag(flag)
    }

    #[inline]
    pub fn set_flag(&mut self, flag: TcpFlags, value: bool) {
        self.header.set_flag(flag, value)
    }

    flag_accessors! { get:
        (fin, FIN),
        (syn, SYN),
        (rst, RST),
        (psh, PSH),
        (ack, ACK),
        (urg, URG),
        (ece, ECE),
        (cwr, CWR),
        (ns, NS),
    }

    flag_accessors! { set:
        (set_fin, FIN),
        (set_syn, SYN),
        (set_rst, RST),
        (set_psh, PSH),
        (set_ack, ACK),
        (set_urg, URG),
        (set_ece, ECE),
        (set_cwr, CWR),
        (set_ns, NS),
    }

    /// The header length in 32-bit words that the current options lead to.
    #[inline]
    pub fn data_offset(&self) -> u8 {
        ((TCP_HEADER_LEN + self.options.padded_len()) / 4) as u8
    }

    #[inline]
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    #[inline]
    pub fn set_payload(&mut self, payload: &'a [u8]) {
        self.payload = payload;
    }

    #[inline]
    pub fn options(&self) -> &TcpOptions {
        &self.options
    }

    /// Append an option of `kind` carrying a copy of `data`.
    #[inline]
    pub fn add_option(&mut self, kind: OptionKind, data: &[u8]) -> Result<()> {
        self.options.add(kind, data)
    }

    #[inline]
    pub fn clear_options(&mut self) {
        self.options.clear()
    }

    /// Append a no-operation option.
    #[inline]
    pub fn add_nop(&mut self) -> Result<()> {
        self.add_option(OptionKind::NOP, &[])
    }

    /// Append a maximum segment size option.
    #[inline]
    pub fn set_mss(&mut self, mss: u16) -> Result<()> {
        self.add_option(OptionKind::MSS, &mss.to_be_bytes())
    }

    /// Append a window scale option.
    #[inline]
    pub fn set_window_scale(&mut self, shift: u8) -> Result<()> {
        self.add_option(OptionKind::WSOPT, &[shift])
    }

    /// Append a selective acknowledgment permitted option.
    #[inline]
    pub fn set_sack_permitted(&mut self) -> Result<()> {
        self.add_option(OptionKind::SACK_PERM, &[])
    }

    /// Append a selective acknowledgment option, one `(left, right)` edge pair
    /// per block.
    pub fn add_sack(&mut self, blocks: &[(u32, u32)]) -> Result<()> {
        let mut data = Vec::with_capacity(blocks.len() * 8);
        for &(left, right) in blocks {
            data.put_u32(left);
            data.put_u32(right);
        }
        self.add_option(OptionKind::SACK, &data[..])
    }

    /// Append a timestamps option holding `value` and the echoed `reply`.
    pub fn set_timestamp(&mut self, value: u32, reply: u32) -> Result<()> {
        let mut data = [0; 8];
        let mut buf = &mut data[..];
        buf.put_u32(value);
        buf.put_u32(reply);
        self.add_option(OptionKind::TS, &data[..])
    }

    /// Append a fast open option carrying `cookie`.
    #[inline]
    pub fn set_fast_open(&mut self, cookie: &[u8]) -> Result<()> {
        self.add_option(OptionKind::FO, cookie)
    }

    /// The length of the serialized segment: fixed header, padded options and
    /// payload.
    #[inline]
    pub fn header_size(&self) -> usize {
        TCP_HEADER_LEN + self.options.padded_len() + self.payload.len()
    }

    /// Serialize the segment into the front of `buf` and return its length.
    ///
    /// If `parent` exposes IPv4 addresses the checksum is computed over the
    /// pseudo-header, the header and everything behind it. Otherwise the
    /// checksum set by the caller is written as it is.
    ///
    /// Nothing is written when `buf` is too small or the segment is too long
    /// for the pseudo-header.
    pub fn serialize<P: PduParent + ?Sized>(&mut self, buf: &mut [u8], parent: &P) -> Result<usize> {
        let total_len = self.header_size();
        let segment_len =
            u16::try_from(total_len).map_err(|_| TcpError::SegmentTooLong(total_len))?;
        if buf.len() < total_len {
            return Err(TcpError::BufferTooSmall {
                required: total_len,
                available: buf.len(),
            });
        }

        // The fixed header is copied in last, once the checksum is known.
        let (header_buf, body_buf) = buf[..total_len].split_at_mut(TCP_HEADER_LEN);
        let data_offset = self.data_offset();
        self.header.set_data_offset(data_offset);

        let mut cursor = &mut body_buf[..];
        self.options.write(&mut cursor);
        cursor.put_slice(self.payload);

        match parent.ipv4_addrs() {
            Some((src_addr, dst_addr)) => {
                self.header.set_checksum(0);
                let sum = checksum_utils::pseudo_header_sum(src_addr, dst_addr, segment_len)
                    + checksum_utils::sum16(body_buf)
                    + checksum_utils::sum16(self.header.as_bytes());
                self.header.set_checksum(!checksum_utils::fold(sum));
                trace!(
                    len = total_len,
                    options = self.options.padded_len(),
                    checksum = self.header.checksum(),
                    "serialized tcp segment {} -> {}",
                    src_addr,
                    dst_addr,
                );
            }
            None => {
                debug!(
                    len = total_len,
                    checksum = self.header.checksum(),
                    "parent has no ipv4 addresses, keeping the preset checksum"
                );
            }
        }

        header_buf.copy_from_slice(self.header.as_bytes());
        Ok(total_len)
    }

    /// Serialize the segment into a new, exactly sized vector.
    pub fn to_vec<P: PduParent + ?Sized>(&mut self, parent: &P) -> Result<Vec<u8>> {
        let mut buf = vec![0; self.header_size()];
        self.serialize(&mut buf[..], parent)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::ParentPdu;

    #[test]
    fn defaults() {
        let seg = TcpSegment::new(1234, 80);
        assert_eq!(seg.src_port(), 1234);
        assert_eq!(seg.dst_port(), 80);
        assert_eq!(seg.seq_number(), 0);
        assert_eq!(seg.ack_number(), 0);
        assert_eq!(seg.window_size(), DEFAULT_WINDOW);
        assert_eq!(seg.checksum(), 0);
        assert_eq!(seg.urgent_ptr(), 0);
        assert_eq!(seg.flags(), TcpFlags::empty());
        assert_eq!(seg.data_offset(), 5);
        assert_eq!(seg.header().data_offset(), 5);
        assert_eq!(seg.header_size(), TCP_HEADER_LEN);
    }

    #[test]
    fn flags_are_independent() {
        let mut seg = TcpSegment::new(1, 2);
        seg.set_syn(true);
        seg.set_ack(true);
        seg.set_cwr(true);
        assert_eq!(seg.flags(), TcpFlags::SYN | TcpFlags::ACK | TcpFlags::CWR);
        seg.set_ack(false);
        assert!(seg.syn());
        assert!(!seg.ack());
        assert!(seg.cwr());
        seg.set_flag(TcpFlags::FIN, true);
        assert!(seg.fin());
        assert!(!seg.rst());
        assert!(!seg.psh());
        assert!(!seg.urg());
        assert!(!seg.ece());
        assert!(!seg.ns());
    }

    #[test]
    fn option_builders_encode_big_endian() {
        let mut seg = TcpSegment::new(1, 2);
        seg.set_mss(1460).unwrap();
        seg.set_timestamp(0x01020304, 0x05060708).unwrap();
        seg.add_sack(&[(500, 1500)]).unwrap();

        let opts: Vec<_> = seg.options().iter().collect();
        assert_eq!(opts[0].kind(), OptionKind::MSS);
        assert_eq!(opts[0].data(), &[0x05, 0xb4]);
        assert_eq!(opts[1].kind(), OptionKind::TS);
        assert_eq!(
            opts[1].data(),
            &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]
        );
        assert_eq!(opts[2].kind(), OptionKind::SACK);
        assert_eq!(
            opts[2].data(),
            &[0x00, 0x00, 0x01, 0xf4, 0x00, 0x00, 0x05, 0xdc]
        );
        // 4 + 10 + 10 bytes.
        assert_eq!(seg.options().raw_len(), 24);
        assert_eq!(seg.data_offset(), 11);
    }

    #[test]
    fn data_offset_written_on_serialize() {
        let mut seg = TcpSegment::new(1, 2);
        seg.set_window_scale(7).unwrap();
        assert_eq!(seg.header().data_offset(), 5);

        let bytes = seg.to_vec(&()).unwrap();
        assert_eq!(bytes.len(), 24);
        assert_eq!(bytes[12] >> 4, 6);
        assert_eq!(seg.header().data_offset(), 6);
        assert_eq!(&bytes[20..], &[0x03, 0x03, 0x07, 0x01]);

        seg.clear_options();
        let bytes = seg.to_vec(&()).unwrap();
        assert_eq!(bytes.len(), 20);
        assert_eq!(bytes[12] >> 4, 5);
    }

    #[test]
    fn short_buffer_is_left_untouched() {
        let payload = [0xab; 10];
        let mut seg = TcpSegment::new(1, 2);
        seg.set_payload(&payload[..]);
        seg.set_mss(1460).unwrap();

        let mut buf = [0xee; 33];
        assert_eq!(
            seg.serialize(&mut buf[..], &ParentPdu::None),
            Err(TcpError::BufferTooSmall {
                required: 34,
                available: 33
            })
        );
        assert!(buf.iter().all(|b| *b == 0xee));
    }

    #[test]
    fn larger_buffer_keeps_its_tail() {
        let mut seg = TcpSegment::new(1, 2);
        let mut buf = [0xee; 30];
        assert_eq!(seg.serialize(&mut buf[..], &()), Ok(20));
        assert!(buf[20..].iter().all(|b| *b == 0xee));
    }

    #[test]
    fn oversized_segment_is_rejected() {
        let payload = vec![0; 65536];
        let mut seg = TcpSegment::new(1, 2);
        seg.set_payload(&payload[..]);

        let mut buf = vec![0; 65556];
        let parent = ParentPdu::Ipv4 {
            src_addr: Ipv4Addr::new(1, 2, 3, 4),
            dst_addr: Ipv4Addr::new(5, 6, 7, 8),
        };
        assert_eq!(
            seg.serialize(&mut buf[..], &parent),
            Err(TcpError::SegmentTooLong(65556))
        );
    }

    #[test]
    fn computed_checksum_verifies() {
        let payload = b"GET / HTTP/1.0\r\n\r\n";
        let src_addr = Ipv4Addr::new(192, 168, 1, 140);
        let dst_addr = Ipv4Addr::new(174, 143, 213, 184);

        let mut seg = TcpSegment::new(57678, 80);
        seg.set_payload(&payload[..]);
        seg.set_seq_number(0x8e501902);
        seg.set_ack_number(0xc7529d89);
        seg.set_psh(true);
        seg.set_ack(true);
        seg.add_nop().unwrap();
        seg.add_nop().unwrap();
        seg.set_timestamp(0x0021d25f, 0x31c7ba48).unwrap();
        // Any preset value is replaced.
        seg.set_checksum(0xdead);

        let bytes = seg
            .to_vec(&ParentPdu::Ipv4 { src_addr, dst_addr })
            .unwrap();
        assert_eq!(bytes.len(), 20 + 12 + payload.len());
        assert!(checksum_utils::verify_ipv4(src_addr, dst_addr, &bytes[..]));
        assert_eq!(u16::from_be_bytes([bytes[16], bytes[17]]), seg.checksum());
        assert_ne!(seg.checksum(), 0xdead);
    }
}
