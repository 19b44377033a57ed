//! Transmission flags (`XMIT_*`) for protocol 28 and newer file-list entries.
//!
//! The low byte is always sent; the high byte only travels when
//! [`XMIT_EXTENDED_FLAGS`] is set, in which case the flags are written as a
//! little-endian shortint. Values mirror upstream `rsync.h`.

/// Top-level directory marker. Also stands in for "no flags" on
/// non-directories so the flag byte is never zero.
pub const XMIT_TOP_DIR: u16 = 1 << 0;
/// Mode equals the previous entry's mode.
pub const XMIT_SAME_MODE: u16 = 1 << 1;
/// Flags are two bytes wide.
pub const XMIT_EXTENDED_FLAGS: u16 = 1 << 2;
/// Owner equals the previous entry's owner.
pub const XMIT_SAME_UID: u16 = 1 << 3;
/// Group equals the previous entry's group.
pub const XMIT_SAME_GID: u16 = 1 << 4;
/// Name shares a prefix with the previous name; its length follows.
pub const XMIT_SAME_NAME: u16 = 1 << 5;
/// Name suffix length is a varint instead of a byte.
pub const XMIT_LONG_NAME: u16 = 1 << 6;
/// Modification time equals the previous entry's.
pub const XMIT_SAME_TIME: u16 = 1 << 7;
