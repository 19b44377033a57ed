use std::collections::BTreeSet;

use super::option::RsyncOption;

/// Version information extracted from the `-e` bundle.
///
/// rsync 3.x clients send `-e<version>.<sub-protocol><capabilities>`, for
/// example `-e.LsfxC` or `-e31.100002C`. The capability letters are also
/// recorded as options on the owning [`RequestData`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProtocolToken {
    /// Protocol version digits before the dot, when present.
    pub version: Option<u32>,
    /// Pre-release sub-protocol digits after the dot, when present.
    pub sub_version: Option<u32>,
    /// Raw letters following the numeric part.
    pub capabilities: String,
}

/// A parsed server invocation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RequestData {
    pub(crate) options: BTreeSet<RsyncOption>,
    pub(crate) files: Vec<String>,
    pub(crate) protocol_token: Option<ProtocolToken>,
    pub(crate) checksum_seed: Option<i32>,
    pub(crate) timeout: Option<u32>,
}

impl RequestData {
    /// Whether `option` was given.
    #[must_use]
    pub fn has(&self, option: RsyncOption) -> bool {
        self.options.contains(&option)
    }

    /// All recognised options.
    #[must_use]
    pub const fn options(&self) -> &BTreeSet<RsyncOption> {
        &self.options
    }

    /// Requested paths in client order.
    #[must_use]
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// The `-e` token, if one was sent.
    #[must_use]
    pub const fn protocol_token(&self) -> Option<&ProtocolToken> {
        self.protocol_token.as_ref()
    }

    /// Value of `--checksum-seed`.
    #[must_use]
    pub const fn checksum_seed(&self) -> Option<i32> {
        self.checksum_seed
    }

    /// Value of `--timeout` in seconds.
    #[must_use]
    pub const fn timeout(&self) -> Option<u32> {
        self.timeout
    }
}
