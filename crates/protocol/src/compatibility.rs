//! # Overview
//!
//! Compatibility flags advertise optional protocol behaviour once both peers
//! have settled on protocol 30 or newer. The server writes the flag byte right
//! after the version exchange; the client never answers with its own byte.
//!
//! # Design
//!
//! [`CompatFlag`] is the closed set of capabilities this server knows about.
//! Every variant owns one bit of the wire byte, and the table behind
//! [`CompatFlag::ALL`] is checked at compile time so no two variants can share
//! a bit and every bit is a power of two. [`CompatFlags`] is the immutable set
//! built from those variants. Its codec is total: every subset encodes to a
//! byte, and every byte decodes to the subset of known flags whose bits are
//! set, ignoring bits this release does not define.
//!
//! # Examples
//!
//! ```
//! use protocol::{CompatFlag, CompatFlags};
//!
//! let flags: CompatFlags = [CompatFlag::SymlinkTimes, CompatFlag::SafeFileList]
//!     .into_iter()
//!     .collect();
//! assert_eq!(flags.encode(), 0b1010);
//! assert_eq!(CompatFlags::decode(0b1010 | 0x80), flags);
//! ```

mod flags;
mod known;

#[cfg(test)]
mod tests;

pub use flags::CompatFlags;
pub use known::CompatFlag;
