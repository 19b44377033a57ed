use std::fmt;

/// Invocation flags an rsync client may pass to a `--server` process.
///
/// Short options carry the letter rsync puts in its bundled option string;
/// long options only have a name.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum RsyncOption {
    /// `--server`
    Server,
    /// `--sender`
    Sender,
    /// `--daemon`
    Daemon,
    /// `--numeric-ids`
    NumericIds,
    /// `--ignore-errors`
    IgnoreErrors,
    /// `--safe-links`
    SafeLinks,
    /// `--copy-unsafe-links`
    CopyUnsafeLinks,
    /// `--no-implied-dirs`
    NoImpliedDirs,
    /// `--size-only`
    SizeOnly,
    /// `-v`
    Verbose,
    /// `-q`
    Quiet,
    /// `-I`, also `--ignore-times`
    IgnoreTimes,
    /// `-L`
    CopyLinks,
    /// `-k`
    CopyDirlinks,
    /// `-K`
    KeepDirlinks,
    /// `-W`
    WholeFile,
    /// `-H`
    HardLinks,
    /// `-l`
    Links,
    /// `-p`
    Perms,
    /// `-E`
    Executability,
    /// `-A`
    Acls,
    /// `-X`
    Xattrs,
    /// `-o`
    Owner,
    /// `-g`
    Group,
    /// `-D`
    Devices,
    /// `-t`
    Times,
    /// `-U`
    Atimes,
    /// `-N`
    Crtimes,
    /// `-O`
    OmitDirTimes,
    /// `-J`
    OmitLinkTimes,
    /// `-S`
    Sparse,
    /// `-n`
    DryRun,
    /// `-x`
    OneFileSystem,
    /// `-R`
    Relative,
    /// `-r`
    Recursive,
    /// `-d`
    Dirs,
    /// `-b`
    Backup,
    /// `-u`
    Update,
    /// `-c`
    Checksum,
    /// `-z`
    Compress,
    /// `-C`
    CvsExclude,
    /// `-y`
    Fuzzy,
    /// `-m`
    PruneEmptyDirs,
    /// `-i`
    ItemizeChanges,
    /// `-s`
    ProtectArgs,
    /// `-f`
    Filter,
}

const SHORT_OPTIONS: &[(char, RsyncOption)] = &[
    ('v', RsyncOption::Verbose),
    ('q', RsyncOption::Quiet),
    ('I', RsyncOption::IgnoreTimes),
    ('L', RsyncOption::CopyLinks),
    ('k', RsyncOption::CopyDirlinks),
    ('K', RsyncOption::KeepDirlinks),
    ('W', RsyncOption::WholeFile),
    ('H', RsyncOption::HardLinks),
    ('l', RsyncOption::Links),
    ('p', RsyncOption::Perms),
    ('E', RsyncOption::Executability),
    ('A', RsyncOption::Acls),
    ('X', RsyncOption::Xattrs),
    ('o', RsyncOption::Owner),
    ('g', RsyncOption::Group),
    ('D', RsyncOption::Devices),
    ('t', RsyncOption::Times),
    ('U', RsyncOption::Atimes),
    ('N', RsyncOption::Crtimes),
    ('O', RsyncOption::OmitDirTimes),
    ('J', RsyncOption::OmitLinkTimes),
    ('S', RsyncOption::Sparse),
    ('n', RsyncOption::DryRun),
    ('x', RsyncOption::OneFileSystem),
    ('R', RsyncOption::Relative),
    ('r', RsyncOption::Recursive),
    ('d', RsyncOption::Dirs),
    ('b', RsyncOption::Backup),
    ('u', RsyncOption::Update),
    ('c', RsyncOption::Checksum),
    ('z', RsyncOption::Compress),
    ('C', RsyncOption::CvsExclude),
    ('y', RsyncOption::Fuzzy),
    ('m', RsyncOption::PruneEmptyDirs),
    ('i', RsyncOption::ItemizeChanges),
    ('s', RsyncOption::ProtectArgs),
    ('f', RsyncOption::Filter),
];

const LONG_OPTIONS: &[(&str, RsyncOption)] = &[
    ("server", RsyncOption::Server),
    ("sender", RsyncOption::Sender),
    ("daemon", RsyncOption::Daemon),
    ("numeric-ids", RsyncOption::NumericIds),
    ("ignore-errors", RsyncOption::IgnoreErrors),
    ("safe-links", RsyncOption::SafeLinks),
    ("copy-unsafe-links", RsyncOption::CopyUnsafeLinks),
    ("no-implied-dirs", RsyncOption::NoImpliedDirs),
    ("size-only", RsyncOption::SizeOnly),
    ("ignore-times", RsyncOption::IgnoreTimes),
];

impl RsyncOption {
    /// Options this server refuses because they change the wire format in
    /// ways the sender does not implement.
    pub const UNSUPPORTED: [Self; 5] = [
        Self::Compress,
        Self::Acls,
        Self::Xattrs,
        Self::Atimes,
        Self::Crtimes,
    ];

    /// Looks up a bundled short option.
    #[must_use]
    pub fn from_short(letter: char) -> Option<Self> {
        SHORT_OPTIONS
            .iter()
            .find(|(candidate, _)| *candidate == letter)
            .map(|(_, option)| *option)
    }

    /// Looks up a flag-style long option by name (without the dashes).
    #[must_use]
    pub fn from_long(name: &str) -> Option<Self> {
        LONG_OPTIONS
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, option)| *option)
    }

    /// The bundled letter for short options.
    #[must_use]
    pub fn short(self) -> Option<char> {
        SHORT_OPTIONS
            .iter()
            .find(|(_, option)| *option == self)
            .map(|(letter, _)| *letter)
    }

    /// The name for long-only options.
    #[must_use]
    pub fn long(self) -> Option<&'static str> {
        LONG_OPTIONS
            .iter()
            .find(|(_, option)| *option == self)
            .map(|(name, _)| *name)
    }
}

impl fmt::Display for RsyncOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.short(), self.long()) {
            (Some(letter), _) => write!(f, "-{letter}"),
            (None, Some(name)) => write!(f, "--{name}"),
            (None, None) => write!(f, "{self:?}"),
        }
    }
}
