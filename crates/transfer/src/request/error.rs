use thiserror::Error;

/// Why a command line was rejected.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ArgsParseReason {
    /// The program name is neither `rsync` nor a path ending in `/rsync`.
    #[error("not an rsync invocation")]
    MissingRsyncCommand,
    /// `--server` is absent.
    #[error("--server flag is missing")]
    MissingServerFlag,
    /// A long option outside the recognised set.
    #[error("unknown option --{0}")]
    UnknownLongOption(String),
    /// A bundled letter outside the recognised set.
    #[error("unknown option -{0}")]
    UnknownShortOption(char),
    /// The `-e` protocol token does not match `e<digits>.<digits><letters>`.
    #[error("malformed protocol token -{0}")]
    MalformedProtocolToken(String),
    /// A long option value that does not parse.
    #[error("invalid value '{value}' for --{option}")]
    InvalidValue {
        /// Option name without dashes.
        option: String,
        /// Offending value.
        value: String,
    },
}

/// Argument-parsing failure carrying the full offending argument list.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{reason}: {}", args.join(" "))]
pub struct ArgsParseError {
    reason: ArgsParseReason,
    args: Vec<String>,
}

impl ArgsParseError {
    pub(crate) fn new<S: AsRef<str>>(reason: ArgsParseReason, args: &[S]) -> Self {
        Self {
            reason,
            args: args.iter().map(|arg| arg.as_ref().to_owned()).collect(),
        }
    }

    /// Replaces the reported arguments, keeping the reason.
    pub(crate) fn with_args<S: AsRef<str>>(self, args: &[S]) -> Self {
        Self::new(self.reason, args)
    }

    /// The specific problem.
    #[must_use]
    pub const fn reason(&self) -> &ArgsParseReason {
        &self.reason
    }

    /// Arguments that were being parsed.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}
