use bytes::BufMut;

use crate::{Result, TcpError};

/// The largest option area behind a 4-bit data offset: 60 - 20 bytes.
pub const TCP_OPTIONS_LEN_MAX: usize = 40;

// Kind and length bytes leave 253 bytes for the data.
const OPTION_DATA_LEN_MAX: usize = u8::MAX as usize - 2;

enum_sim! {
    /// An enum-like type for representing TCP option kinds.
    ///
    /// Any 8-bit kind is accepted, the constants name the common ones.
    pub struct OptionKind (u8) {
        /// End of option list.
        EOL = 0,

        /// No-operation, a single padding byte.
        NOP = 1,

        /// Maximum segment size.
        MSS = 2,

        /// Window scale.
        WSOPT = 3,

        /// Selective acknowledgment permitted.
        SACK_PERM = 4,

        /// Selective acknowledgment blocks.
        SACK = 5,

        /// Timestamps.
        TS = 8,

        /// Tcp fast open cookie.
        FO = 34,
    }
}

/// A TCP option holding its own copy of the option data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpOption {
    kind: OptionKind,
    data: Vec<u8>,
}

impl TcpOption {
    #[inline]
    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data[..]
    }

    /// Number of bytes the option takes on the wire.
    ///
    /// A no-operation option is a single byte whatever data it stores.
    #[inline]
    pub fn wire_len(&self) -> usize {
        wire_len(self.kind, self.data.len())
    }

    fn write<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.kind.raw());
        if self.kind != OptionKind::NOP {
            buf.put_u8(self.wire_len() as u8);
            buf.put_slice(&self.data[..]);
        }
    }
}

#[inline]
fn wire_len(kind: OptionKind, data_len: usize) -> usize {
    if kind == OptionKind::NOP {
        1
    } else {
        data_len + 2
    }
}

#[inline]
fn padded(len: usize) -> usize {
    (len + 3) & !3
}

/// The ordered option list of a TCP segment.
///
/// Options are written in insertion order. Duplicates are kept as they are.
#[derive(Debug, Clone, Default)]
pub struct TcpOptions {
    opts: Vec<TcpOption>,
    raw_len: usize,
}

impl TcpOptions {
    /// Create an empty option list.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `data` into a new option of `kind` and append it.
    ///
    /// Fails without touching the list if the option can not be encoded, or if
    /// the padded option area would outgrow the 40 bytes a TCP header offers.
    pub fn add(&mut self, kind: OptionKind, data: &[u8]) -> Result<()> {
        if kind != OptionKind::NOP && data.len() > OPTION_DATA_LEN_MAX {
            return Err(TcpError::OptionTooLong {
                kind: kind.raw(),
                len: data.len(),
            });
        }

        let raw_len = self.raw_len + wire_len(kind, data.len());
        if padded(raw_len) > TCP_OPTIONS_LEN_MAX {
            return Err(TcpError::OptionSpaceExhausted {
                required: padded(raw_len),
            });
        }

        self.opts.push(TcpOption {
            kind,
            data: data.to_vec(),
        });
        self.raw_len = raw_len;
        Ok(())
    }

    /// Drop every option.
    #[inline]
    pub fn clear(&mut self) {
        self.opts.clear();
        self.raw_len = 0;
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, TcpOption> {
        self.opts.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.opts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.opts.is_empty()
    }

    /// Bytes taken by the encoded options, without padding.
    #[inline]
    pub fn raw_len(&self) -> usize {
        self.raw_len
    }

    /// Bytes taken by the encoded options, padded to a 4-byte boundary.
    #[inline]
    pub fn padded_len(&self) -> usize {
        padded(self.raw_len)
    }

    /// Write every option followed by no-operation padding, `padded_len`
    /// bytes in total.
    ///
    /// # Panics
    ///
    /// Panics if `buf` has less than `padded_len` bytes of room left.
    pub fn write<B: BufMut>(&self, buf: &mut B) {
        assert!(buf.remaining_mut() >= self.padded_len());
        for opt in self.opts.iter() {
            opt.write(buf);
        }
        buf.put_bytes(OptionKind::NOP.raw(), self.padded_len() - self.raw_len);
    }
}

impl<'a> IntoIterator for &'a TcpOptions {
    type Item = &'a TcpOption;
    type IntoIter = std::slice::Iter<'a, TcpOption>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.opts.iter()
    }
}
