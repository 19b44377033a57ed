//! Process exit codes reported for finished commands.
//!
//! The numbering matches upstream rsync's `errcode.h`; clients print the
//! matching `log.c` description when the remote side exits with one of them.

use std::fmt;

/// Exit codes a command invocation can report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful completion (RERR_OK = 0).
    Ok = 0,

    /// Syntax or usage error (RERR_SYNTAX = 1).
    Syntax = 1,

    /// Protocol incompatibility (RERR_PROTOCOL = 2).
    ///
    /// Returned when the client and server cannot agree on a protocol
    /// version or when the protocol is violated.
    Protocol = 2,

    /// Errors selecting input/output files or directories (RERR_FILESELECT = 3).
    ///
    /// Returned when a requested path is not tracked or is not a regular file.
    FileSelect = 3,

    /// Requested action not supported (RERR_UNSUPPORTED = 4).
    Unsupported = 4,

    /// Error in socket I/O (RERR_SOCKETIO = 10).
    ///
    /// Also reported when an invocation is started without all three streams.
    SocketIo = 10,

    /// Error in file I/O (RERR_FILEIO = 11).
    FileIo = 11,

    /// Error in rsync protocol data stream (RERR_STREAMIO = 12).
    ///
    /// The catch-all for commands that could not be resolved or that failed
    /// without a more specific code.
    StreamIo = 12,

    /// Partial transfer due to error (RERR_PARTIAL = 23).
    PartialTransfer = 23,

    /// Timeout in data send/receive (RERR_TIMEOUT = 30).
    Timeout = 30,
}

impl ExitCode {
    /// Returns the numeric exit code value.
    ///
    /// # Examples
    ///
    /// ```
    /// use transfer::ExitCode;
    ///
    /// assert_eq!(ExitCode::Ok.as_i32(), 0);
    /// assert_eq!(ExitCode::StreamIo.as_i32(), 12);
    /// ```
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns the upstream description of this exit code.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Ok => "success",
            Self::Syntax => "syntax or usage error",
            Self::Protocol => "protocol incompatibility",
            Self::FileSelect => "errors selecting input/output files, dirs",
            Self::Unsupported => "requested action not supported",
            Self::SocketIo => "error in socket IO",
            Self::FileIo => "error in file IO",
            Self::StreamIo => "error in rsync protocol data stream",
            Self::PartialTransfer => "partial transfer",
            Self::Timeout => "timeout in data send/receive",
        }
    }

    /// Returns `true` if this represents a successful exit.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Creates an exit code from an i32 value.
    ///
    /// Returns `None` if the value doesn't correspond to a known exit code.
    #[must_use]
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Ok),
            1 => Some(Self::Syntax),
            2 => Some(Self::Protocol),
            3 => Some(Self::FileSelect),
            4 => Some(Self::Unsupported),
            10 => Some(Self::SocketIo),
            11 => Some(Self::FileIo),
            12 => Some(Self::StreamIo),
            23 => Some(Self::PartialTransfer),
            30 => Some(Self::Timeout),
            _ => None,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        // every variant fits in a u8
        Self::from(code.as_i32() as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ExitCode; 10] = [
        ExitCode::Ok,
        ExitCode::Syntax,
        ExitCode::Protocol,
        ExitCode::FileSelect,
        ExitCode::Unsupported,
        ExitCode::SocketIo,
        ExitCode::FileIo,
        ExitCode::StreamIo,
        ExitCode::PartialTransfer,
        ExitCode::Timeout,
    ];

    #[test]
    fn numbering_matches_errcode_h() {
        let values: Vec<_> = ALL.iter().map(|code| code.as_i32()).collect();
        assert_eq!(values, vec![0, 1, 2, 3, 4, 10, 11, 12, 23, 30]);
    }

    #[test]
    fn from_i32_inverts_as_i32() {
        for code in ALL {
            assert_eq!(ExitCode::from_i32(code.as_i32()), Some(code));
        }
        assert_eq!(ExitCode::from_i32(5), None);
        assert_eq!(ExitCode::from_i32(-1), None);
    }

    #[test]
    fn only_ok_is_success() {
        assert!(ExitCode::Ok.is_success());
        assert!(ALL[1..].iter().all(|code| !code.is_success()));
    }

    #[test]
    fn display_uses_upstream_wording() {
        assert_eq!(ExitCode::StreamIo.to_string(), "error in rsync protocol data stream");
        assert_eq!(ExitCode::SocketIo.to_string(), "error in socket IO");
    }
}
