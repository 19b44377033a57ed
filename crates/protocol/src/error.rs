use crate::version::ProtocolVersion;

/// Errors raised while agreeing on a protocol version with a client.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum NegotiationError {
    /// The client advertised a version outside the supported range.
    #[error("protocol version mismatch: client advertised {advertised}, server supports {min}..={max}")]
    UnsupportedVersion {
        /// Raw value read from the client.
        advertised: i32,
        /// Lowest accepted version.
        min: ProtocolVersion,
        /// Highest version the server speaks.
        max: ProtocolVersion,
    },
}

impl NegotiationError {
    /// Returns the version the client advertised.
    #[must_use]
    pub const fn advertised(&self) -> i32 {
        match self {
            Self::UnsupportedVersion { advertised, .. } => *advertised,
        }
    }
}
