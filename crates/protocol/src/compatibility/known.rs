use std::fmt;

/// Capability flags that may appear in the compatibility byte.
///
/// The variants mirror the `CF_*` identifiers from upstream `compat.c` that
/// fit in the single byte exchanged by this server. Ordering follows the bit
/// positions, lowest first.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum CompatFlag {
    /// Sender and receiver support incremental recursion (`CF_INC_RECURSE`).
    #[doc(alias = "CF_INC_RECURSE")]
    IncRecurse,
    /// Symlink timestamps can be preserved (`CF_SYMLINK_TIMES`).
    #[doc(alias = "CF_SYMLINK_TIMES")]
    SymlinkTimes,
    /// Symlink payload requires iconv translation (`CF_SYMLINK_ICONV`).
    #[doc(alias = "CF_SYMLINK_ICONV")]
    SymlinkIconv,
    /// Receiver requests the "safe" file list (`CF_SAFE_FLIST`).
    #[doc(alias = "CF_SAFE_FLIST")]
    SafeFileList,
    /// Receiver cannot use the xattr optimization (`CF_AVOID_XATTR_OPTIM`).
    #[doc(alias = "CF_AVOID_XATTR_OPTIM")]
    AvoidXattrOptimization,
    /// Checksum seed handling follows the fixed ordering (`CF_CHKSUM_SEED_FIX`).
    #[doc(alias = "CF_CHKSUM_SEED_FIX")]
    ChecksumSeedFix,
}

impl CompatFlag {
    /// Every defined flag in ascending bit order.
    pub const ALL: [Self; 6] = [
        Self::IncRecurse,
        Self::SymlinkTimes,
        Self::SymlinkIconv,
        Self::SafeFileList,
        Self::AvoidXattrOptimization,
        Self::ChecksumSeedFix,
    ];

    /// Returns the mask this flag occupies in the compatibility byte.
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::IncRecurse => 1 << 0,
            Self::SymlinkTimes => 1 << 1,
            Self::SymlinkIconv => 1 << 2,
            Self::SafeFileList => 1 << 3,
            Self::AvoidXattrOptimization => 1 << 4,
            Self::ChecksumSeedFix => 1 << 5,
        }
    }

    /// Returns the upstream identifier, e.g. `CF_SAFE_FLIST`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::IncRecurse => "CF_INC_RECURSE",
            Self::SymlinkTimes => "CF_SYMLINK_TIMES",
            Self::SymlinkIconv => "CF_SYMLINK_ICONV",
            Self::SafeFileList => "CF_SAFE_FLIST",
            Self::AvoidXattrOptimization => "CF_AVOID_XATTR_OPTIM",
            Self::ChecksumSeedFix => "CF_CHKSUM_SEED_FIX",
        }
    }

    /// Returns the capability letter a client places after `-e.` to announce
    /// support for this flag.
    #[must_use]
    pub const fn capability_letter(self) -> char {
        match self {
            Self::IncRecurse => 'i',
            Self::SymlinkTimes => 'L',
            Self::SymlinkIconv => 's',
            Self::SafeFileList => 'f',
            Self::AvoidXattrOptimization => 'x',
            Self::ChecksumSeedFix => 'C',
        }
    }

    /// Maps a capability letter back to its flag.
    #[must_use]
    pub fn from_capability_letter(letter: char) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|flag| flag.capability_letter() == letter)
    }
}

impl fmt::Display for CompatFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const fn bits_are_distinct_powers_of_two() -> bool {
    let mut seen = 0u8;
    let mut index = 0;
    while index < CompatFlag::ALL.len() {
        let bit = CompatFlag::ALL[index].bit();
        if !bit.is_power_of_two() || seen & bit != 0 {
            return false;
        }
        seen |= bit;
        index += 1;
    }
    true
}

const _: () = assert!(
    bits_are_distinct_powers_of_two(),
    "compatibility flag masks must be distinct powers of two"
);
