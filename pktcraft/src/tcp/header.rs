use std::ops::{BitOr, BitOrAssign};

use byteorder::{ByteOrder, NetworkEndian};

header_field_range_accessors! {
    (src_port, src_port_mut, 0..2),
    (dst_port, dst_port_mut, 2..4),
    (seq_num, seq_num_mut, 4..8),
    (ack_num, ack_num_mut, 8..12),
    (off_flags, off_flags_mut, 12..14),
    (win_size, win_size_mut, 14..16),
    (checksum, checksum_mut, 16..18),
    (urgent, urgent_mut, 18..20),
}

/// The fixed length of the TCP header in bytes.
pub const TCP_HEADER_LEN: usize = 20;

const DATA_OFFSET_MASK: u16 = 0xf000;
const FLAGS_MASK: u16 = 0x01ff;

/// A fixed TCP header: data offset of 5 words, window of 32678, everything
/// else zeroed.
pub const TCP_HEADER_TEMPLATE: TcpHeader<[u8; TCP_HEADER_LEN]> = TcpHeader {
    buf: [
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x50, 0x00, 0x7f,
        0xa6, 0x00, 0x00, 0x00, 0x00,
    ],
};

/// The TCP control bits, as laid out in the low 9 bits of header bytes 12..14.
#[derive(Debug, Default, Hash, PartialEq, Eq, Clone, Copy)]
pub struct TcpFlags(u16);

impl TcpFlags {
    /// No more data from sender.
    pub const FIN: Self = Self(0x001);
    /// Synchronize sequence numbers.
    pub const SYN: Self = Self(0x001 << 1);
    /// Reset the connection.
    pub const RST: Self = Self(0x001 << 2);
    /// Push function.
    pub const PSH: Self = Self(0x001 << 3);
    /// Acknowledgment field significant.
    pub const ACK: Self = Self(0x001 << 4);
    /// Urgent pointer field significant.
    pub const URG: Self = Self(0x001 << 5);
    /// ECN-echo.
    pub const ECE: Self = Self(0x001 << 6);
    /// Congestion window reduced.
    pub const CWR: Self = Self(0x001 << 7);
    /// ECN-nonce concealment protection.
    pub const NS: Self = Self(0x001 << 8);

    /// A flag set with every bit cleared.
    #[inline]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// The raw bits, NS in bit 8 and FIN in bit 0.
    #[inline]
    pub const fn bits(&self) -> u16 {
        self.0
    }

    /// Build a flag set from raw bits, dropping anything outside the 9 flags.
    #[inline]
    pub const fn from_bits_truncate(bits: u16) -> Self {
        Self(bits & FLAGS_MASK)
    }

    /// Whether every bit of `other` is set in `self`.
    #[inline]
    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set or clear the bits of `other`.
    #[inline]
    pub fn set(&mut self, other: Self, value: bool) {
        if value {
            self.0 |= other.0;
        } else {
            self.0 &= !other.0;
        }
    }
}

impl BitOr for TcpFlags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TcpFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// The fixed 20-byte TCP header stored in a buffer `T`.
///
/// Every accessor reads or writes its field at the exact wire position in
/// network byte order, so `as_bytes` is always wire-ready.
#[derive(Clone, Copy, Debug)]
pub struct TcpHeader<T> {
    buf: T,
}

impl<T: AsRef<[u8]>> TcpHeader<T> {
    /// Wrap `buf`, failing if it is shorter than the fixed header.
    #[inline]
    pub fn new(buf: T) -> Result<Self, T> {
        if buf.as_ref().len() >= TCP_HEADER_LEN {
            Ok(Self { buf })
        } else {
            Err(buf)
        }
    }

    /// Wrap `buf` without checking its length.
    #[inline]
    pub fn new_unchecked(buf: T) -> Self {
        Self { buf }
    }

    /// The 20 header bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf.as_ref()[0..TCP_HEADER_LEN]
    }

    #[inline]
    pub fn src_port(&self) -> u16 {
        NetworkEndian::read_u16(src_port(self.buf.as_ref()))
    }

    #[inline]
    pub fn dst_port(&self) -> u16 {
        NetworkEndian::read_u16(dst_port(self.buf.as_ref()))
    }

    #[inline]
    pub fn seq_number(&self) -> u32 {
        NetworkEndian::read_u32(seq_num(self.buf.as_ref()))
    }

    #[inline]
    pub fn ack_number(&self) -> u32 {
        NetworkEndian::read_u32(ack_num(self.buf.as_ref()))
    }

    /// The header length in 32-bit words.
    #[inline]
    pub fn data_offset(&self) -> u8 {
        let raw = NetworkEndian::read_u16(off_flags(self.buf.as_ref()));
        ((raw & DATA_OFFSET_MASK) >> 12) as u8
    }

    /// The header length in bytes, options included.
    #[inline]
    pub fn header_len(&self) -> u8 {
        self.data_offset() * 4
    }

    #[inline]
    pub fn flags(&self) -> TcpFlags {
        TcpFlags::from_bits_truncate(NetworkEndian::read_u16(off_flags(self.buf.as_ref())))
    }

    #[inline]
    pub fn flag(&self, flag: TcpFlags) -> bool {
        self.flags().contains(flag)
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

    #[inline]
    pub fn window_size(&self) -> u16 {
        NetworkEndian::read_u16(win_size(self.buf.as_ref()))
    }

    #[inline]
    pub fn checksum(&self) -> u16 {
        NetworkEndian::read_u16(checksum(self.buf.as_ref()))
    }

    #[inline]
    pub fn urgent_ptr(&self) -> u16 {
        NetworkEndian::read_u16(urgent(self.buf.as_ref()))
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> TcpHeader<T> {
    #[inline]
    pub fn set_src_port(&mut self, value: u16) {
        NetworkEndian::write_u16(src_port_mut(self.buf.as_mut()), value)
    }

    #[inline]
    pub fn set_dst_port(&mut self, value: u16) {
        NetworkEndian::write_u16(dst_port_mut(self.buf.as_mut()), value)
    }

    #[inline]
    pub fn set_seq_number(&mut self, value: u32) {
        NetworkEndian::write_u32(seq_num_mut(self.buf.as_mut()), value)
    }

    #[inline]
    pub fn set_ack_number(&mut self, value: u32) {
        NetworkEndian::write_u32(ack_num_mut(self.buf.as_mut()), value)
    }

    /// Set the header length in 32-bit words.
    ///
    /// # Panics
    ///
    /// Panics if `value` is outside `5..=15`.
    #[inline]
    pub fn set_data_offset(&mut self, value: u8) {
        assert!((5..=15).contains(&value));
        let data = off_flags_mut(self.buf.as_mut());
        let raw = NetworkEndian::read_u16(data);
        let raw = (raw & !DATA_OFFSET_MASK) | ((value as u16) << 12);
        NetworkEndian::write_u16(data, raw)
    }

    /// Overwrite all 9 control bits, leaving the data offset and the reserved
    /// bits alone.
    #[inline]
    pub fn set_flags(&mut self, flags: TcpFlags) {
        let data = off_flags_mut(self.buf.as_mut());
        let raw = (NetworkEndian::read_u16(data) & !FLAGS_MASK) | flags.bits();
        NetworkEndian::write_u16(data, raw)
    }

    #[inline]
    pub fn set_flag(&mut self, flag: TcpFlags, value: bool) {
        let mut flags = self.flags();
        flags.set(flag, value);
        self.set_flags(flags)
    }

    #[inline]
    pub fn set_window_size(&mut self, value: u16) {
        NetworkEndian::write_u16(win_size_mut(self.buf.as_mut()), value)
    }

    #[inline]
    pub fn set_checksum(&mut self, value: u16) {
        NetworkEndian::write_u16(checksum_mut(self.buf.as_mut()), value)
    }

    #[inline]
    pub fn set_urgent_ptr(&mut self, value: u16) {
        NetworkEndian::write_u16(urgent_mut(self.buf.as_mut()), value)
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
}
