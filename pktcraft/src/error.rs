use thiserror::Error;

/// A specialized result type for segment construction.
pub type Result<T> = std::result::Result<T, TcpError>;

/// Errors raised while building or serializing a TCP segment.
///
/// Every variant reports a contract violation by the caller. Nothing in this
/// crate performs I/O, so none of them is worth retrying unchanged.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum TcpError {
    /// The output buffer can not hold the whole segment.
    #[error("the segment needs {required} bytes, but the buffer only holds {available}")]
    BufferTooSmall {
        /// Bytes needed by the segment.
        required: usize,
        /// Bytes offered by the buffer.
        available: usize,
    },

    /// The option data does not fit behind the 8-bit option length field.
    #[error("option kind {kind} carries {len} data bytes, the length field allows at most 253")]
    OptionTooLong {
        /// Raw option kind.
        kind: u8,
        /// Length of the rejected option data.
        len: usize,
    },

    /// The padded option area would not fit behind the 4-bit data offset.
    #[error("options need {required} padded bytes, the tcp header has room for 40")]
    OptionSpaceExhausted {
        /// Padded option bytes the store would have needed.
        required: usize,
    },

    /// The segment is too long for the 16-bit pseudo-header length.
    #[error("segment length {0} does not fit in the pseudo-header length field")]
    SegmentTooLong(usize),
}
