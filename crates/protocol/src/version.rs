use std::fmt;

use crate::config::{
    CLIENT_PROTOCOL_VERSION_MAX, CLIENT_PROTOCOL_VERSION_MIN, MAXIMUM_PROTOCOL_ADVERTISEMENT,
};
use crate::error::NegotiationError;

/// A negotiated rsync protocol version.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ProtocolVersion(u8);

impl ProtocolVersion {
    /// Protocol 31, shipped with rsync 3.1.
    pub const V31: Self = Self(31);

    /// Wraps a raw version number.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Returns the numeric version.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Returns the version as the 32-bit integer written on the wire.
    #[must_use]
    pub const fn as_wire(self) -> i32 {
        self.0 as i32
    }

    /// Protocol 30 introduced the compatibility byte, multiplexed input for
    /// the server sender and varint-encoded integers.
    #[must_use]
    pub const fn uses_compat_flags(self) -> bool {
        self.0 >= 30
    }

    /// Protocol 31 added the extra goodbye round trip at the end of a session.
    #[must_use]
    pub const fn has_extended_goodbye(self) -> bool {
        self.0 >= 31
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Picks the version used with a client that advertised `client`.
///
/// Clients older than [`CLIENT_PROTOCOL_VERSION_MIN`] are rejected. Newer
/// clients speak [`CLIENT_PROTOCOL_VERSION_MAX`] with us, following rsync's
/// rule that both sides use the lower of the two versions. Advertisements
/// above [`MAXIMUM_PROTOCOL_ADVERTISEMENT`] are rejected as corrupt.
pub fn negotiate_protocol_version(client: i32) -> Result<ProtocolVersion, NegotiationError> {
    let min = i32::from(CLIENT_PROTOCOL_VERSION_MIN.as_u8());
    if client < min || client > MAXIMUM_PROTOCOL_ADVERTISEMENT {
        return Err(NegotiationError::UnsupportedVersion {
            advertised: client,
            min: CLIENT_PROTOCOL_VERSION_MIN,
            max: CLIENT_PROTOCOL_VERSION_MAX,
        });
    }
    let max = i32::from(CLIENT_PROTOCOL_VERSION_MAX.as_u8());
    Ok(ProtocolVersion::new(client.min(max) as u8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_the_supported_version() {
        assert_eq!(negotiate_protocol_version(31), Ok(ProtocolVersion::V31));
    }

    #[test]
    fn clamps_newer_clients() {
        assert_eq!(negotiate_protocol_version(32), Ok(ProtocolVersion::V31));
        assert_eq!(negotiate_protocol_version(40), Ok(ProtocolVersion::V31));
    }

    #[test]
    fn rejects_older_clients() {
        let err = negotiate_protocol_version(30).unwrap_err();
        assert_eq!(err.advertised(), 30);
        assert!(err.to_string().contains("31..=31"));
    }

    #[test]
    fn rejects_garbage_advertisements() {
        assert!(negotiate_protocol_version(41).is_err());
        assert!(negotiate_protocol_version(-1).is_err());
        assert!(negotiate_protocol_version(0x7273_796e).is_err());
    }

    #[test]
    fn feature_gates_follow_version() {
        assert!(ProtocolVersion::V31.uses_compat_flags());
        assert!(ProtocolVersion::V31.has_extended_goodbye());
        assert!(!ProtocolVersion::new(29).uses_compat_flags());
        assert!(!ProtocolVersion::new(30).has_extended_goodbye());
    }

    proptest! {
        #[test]
        fn negotiated_version_stays_in_range(client in any::<i32>()) {
            if let Ok(version) = negotiate_protocol_version(client) {
                prop_assert!(version >= CLIENT_PROTOCOL_VERSION_MIN);
                prop_assert!(version <= CLIENT_PROTOCOL_VERSION_MAX);
            }
        }
    }
}
