#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

//! Provide utilities for constructing TCP segments and serializing them into
//! wire-exact bytes.
//!
//! A [`tcp::TcpSegment`] holds the header fields, an ordered list of TCP
//! options and a borrowed payload. [`tcp::TcpSegment::serialize`] lays out the
//! header, the 4-byte aligned options and the payload, and patches in the
//! Internet checksum whenever the enclosing [`PduParent`] exposes IPv4
//! addresses.

#[macro_use]
mod macros;

mod error;
pub use error::{Result, TcpError};

mod parent;
pub use parent::{ParentPdu, PduParent};

pub mod checksum_utils;

pub mod ipv4;
pub mod tcp;
