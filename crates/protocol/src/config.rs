//! Fixed negotiation parameters shared by every sender session.
//!
//! The values are process-wide constants: nothing in the server changes them
//! after start-up, so they are plain `const` items rather than a runtime
//! configuration object.

use crate::compatibility::{CompatFlag, CompatFlags};
use crate::version::ProtocolVersion;

/// Oldest client protocol version the server accepts.
pub const CLIENT_PROTOCOL_VERSION_MIN: ProtocolVersion = ProtocolVersion::V31;

/// Newest protocol version the server speaks with a client.
///
/// Clients advertising a newer version are clamped down to this value.
pub const CLIENT_PROTOCOL_VERSION_MAX: ProtocolVersion = ProtocolVersion::V31;

/// Version the server writes during the initial exchange.
pub const SERVER_PROTOCOL_VERSION: ProtocolVersion = ProtocolVersion::V31;

/// Upper bound on a sane client advertisement.
///
/// Values above it are treated as garbage on the stream (for example a shell
/// banner) rather than as a newer rsync.
pub const MAXIMUM_PROTOCOL_ADVERTISEMENT: i32 = 40;

/// Compatibility flags advertised to every client, regardless of what the
/// client announced in its `-e` token.
pub const SERVER_COMPAT_FLAGS: CompatFlags = CompatFlags::from_flags(&[
    CompatFlag::SymlinkTimes,
    CompatFlag::SymlinkIconv,
    CompatFlag::SafeFileList,
    CompatFlag::AvoidXattrOptimization,
]);

/// Maximum number of file-list entries written before the stream is flushed.
pub const FILE_LIST_PARTITION_LIMIT: usize = 1024;

/// Size of one literal data token sent during a transfer.
pub const CHUNK_SIZE: usize = 8 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_bounds_pin_protocol_31() {
        assert_eq!(CLIENT_PROTOCOL_VERSION_MIN.as_u8(), 31);
        assert_eq!(CLIENT_PROTOCOL_VERSION_MAX.as_u8(), 31);
        assert_eq!(SERVER_PROTOCOL_VERSION, CLIENT_PROTOCOL_VERSION_MAX);
    }

    #[test]
    fn server_flags_exclude_inc_recurse_and_seed_fix() {
        assert_eq!(SERVER_COMPAT_FLAGS.encode(), 2 | 4 | 8 | 16);
        assert!(!SERVER_COMPAT_FLAGS.contains(CompatFlag::IncRecurse));
        assert!(!SERVER_COMPAT_FLAGS.contains(CompatFlag::ChecksumSeedFix));
    }

    #[test]
    fn transfer_sizes() {
        assert_eq!(FILE_LIST_PARTITION_LIMIT, 1024);
        assert_eq!(CHUNK_SIZE, 8192);
    }
}
