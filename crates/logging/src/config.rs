use std::path::PathBuf;

/// Logging configuration derived from command-line flags.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LogConfig {
    /// Number of `-v` flags given.
    pub verbosity: u8,
    /// File receiving the log output instead of stderr.
    pub log_file: Option<PathBuf>,
}

impl LogConfig {
    /// Creates a configuration for `level` repetitions of `-v`.
    #[must_use]
    pub fn from_verbose_level(level: u8) -> Self {
        Self {
            verbosity: level,
            log_file: None,
        }
    }

    /// Sends output to `path`.
    #[must_use]
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Filter directive used when `RUST_LOG` is unset.
    #[must_use]
    pub const fn default_directive(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
