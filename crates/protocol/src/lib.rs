#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_docs)]

//! Wire-level building blocks for serving rsync clients as a sender.
//!
//! The crate groups the pieces of the rsync protocol that are independent of
//! how files are located or how the session is transported: the
//! compatibility flag byte, the fixed negotiation parameters, integer codecs,
//! the multiplexed message envelope, the file index codec and the file-list
//! entry encoder. Higher layers (the `transfer` crate) compose them into the
//! server sender session.
//!
//! # Examples
//!
//! The server advertises a fixed subset of compatibility flags:
//!
//! ```
//! use protocol::{CompatFlag, CompatFlags, SERVER_COMPAT_FLAGS};
//!
//! assert_eq!(SERVER_COMPAT_FLAGS.encode(), 30);
//! assert!(SERVER_COMPAT_FLAGS.contains(CompatFlag::SafeFileList));
//! assert_eq!(CompatFlags::decode(SERVER_COMPAT_FLAGS.encode()), SERVER_COMPAT_FLAGS);
//! ```
//!
//! Protocol versions are clamped to the supported range:
//!
//! ```
//! use protocol::{ProtocolVersion, negotiate_protocol_version};
//!
//! assert_eq!(negotiate_protocol_version(32).unwrap(), ProtocolVersion::V31);
//! assert!(negotiate_protocol_version(29).is_err());
//! ```

mod compatibility;
mod config;
mod envelope;
mod error;
mod item;
mod multiplex;
mod ndx;
mod sum_head;
mod varint;
mod version;

pub mod flist;

pub use compatibility::{CompatFlag, CompatFlags};
pub use config::{
    CHUNK_SIZE, CLIENT_PROTOCOL_VERSION_MAX, CLIENT_PROTOCOL_VERSION_MIN,
    FILE_LIST_PARTITION_LIMIT, MAXIMUM_PROTOCOL_ADVERTISEMENT, SERVER_COMPAT_FLAGS,
    SERVER_PROTOCOL_VERSION,
};
pub use envelope::{
    EnvelopeError, HEADER_LEN as MESSAGE_HEADER_LEN, MAX_PAYLOAD_LENGTH, MPLEX_BASE, MessageCode,
    MessageHeader,
};
pub use error::NegotiationError;
pub use item::ItemFlags;
pub use multiplex::{MultiplexReader, MultiplexWriter, send_msg};
pub use ndx::{NDX_DONE, NDX_FLIST_EOF, NdxState};
pub use sum_head::{MAX_BLOCK_SIZE, MAX_DIGEST_LEN, SumHead};
pub use varint::{
    read_byte, read_int, read_shortint, read_varint, read_varlong, read_vstring, write_byte,
    write_int, write_shortint, write_varint, write_varlong, write_vstring,
};
pub use version::{ProtocolVersion, negotiate_protocol_version};
