//! Multiplexed message envelope.
//!
//! Once a session is running, every chunk written by the server travels in a
//! frame prefixed by a four-byte little-endian header. The top byte is the
//! message code offset by [`MPLEX_BASE`]; the low 24 bits hold the payload
//! length.

mod error;
mod header;
mod message_code;


pub use error::EnvelopeError;
pub use header::MessageHeader;
pub use message_code::MessageCode;

/// Size of an encoded header in bytes.
pub const HEADER_LEN: usize = 4;

/// Offset added to a [`MessageCode`] to form the header tag byte.
pub const MPLEX_BASE: u8 = 7;

/// Largest payload a single frame can carry.
pub const MAX_PAYLOAD_LENGTH: u32 = 0x00FF_FFFF;
