//! Tcp protocol.

mod header;
pub use header::{TcpFlags, TcpHeader, TCP_HEADER_LEN, TCP_HEADER_TEMPLATE};

mod option;
pub use option::{OptionKind, TcpOption, TcpOptions, TCP_OPTIONS_LEN_MAX};

mod segment;
pub use segment::{TcpSegment, DEFAULT_WINDOW};
