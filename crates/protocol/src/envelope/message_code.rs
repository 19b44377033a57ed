use std::fmt;

/// Message codes carried in a multiplexed frame header.
///
/// Numbering follows upstream `enum msgcode` in `rsync.h`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum MessageCode {
    /// File data and protocol payload (`MSG_DATA`).
    #[doc(alias = "MSG_DATA")]
    Data = 0,
    /// Fatal transfer error (`MSG_ERROR_XFER`).
    #[doc(alias = "MSG_ERROR_XFER")]
    ErrorXfer = 1,
    /// Informational message (`MSG_INFO`).
    #[doc(alias = "MSG_INFO")]
    Info = 2,
    /// Non-fatal error (`MSG_ERROR`).
    #[doc(alias = "MSG_ERROR")]
    Error = 3,
    /// Warning (`MSG_WARNING`).
    #[doc(alias = "MSG_WARNING")]
    Warning = 4,
    /// Error relayed from a sibling process (`MSG_ERROR_SOCKET`).
    #[doc(alias = "MSG_ERROR_SOCKET")]
    ErrorSocket = 5,
    /// Daemon log line (`MSG_LOG`).
    #[doc(alias = "MSG_LOG")]
    Log = 6,
    /// Client-only message (`MSG_CLIENT`).
    #[doc(alias = "MSG_CLIENT")]
    Client = 7,
    /// Filename conversion problem (`MSG_ERROR_UTF8`).
    #[doc(alias = "MSG_ERROR_UTF8")]
    ErrorUtf8 = 8,
    /// Request to resend a file (`MSG_REDO`).
    #[doc(alias = "MSG_REDO")]
    Redo = 9,
    /// Transfer statistics (`MSG_STATS`).
    #[doc(alias = "MSG_STATS")]
    Stats = 10,
    /// Sender-side I/O error flag (`MSG_IO_ERROR`).
    #[doc(alias = "MSG_IO_ERROR")]
    IoError = 22,
    /// Peer timeout announcement (`MSG_IO_TIMEOUT`).
    #[doc(alias = "MSG_IO_TIMEOUT")]
    IoTimeout = 33,
    /// Keep-alive with no payload meaning (`MSG_NOOP`).
    #[doc(alias = "MSG_NOOP")]
    NoOp = 42,
    /// Synchronised error exit (`MSG_ERROR_EXIT`).
    #[doc(alias = "MSG_ERROR_EXIT")]
    ErrorExit = 86,
    /// Receiver finished a file (`MSG_SUCCESS`).
    #[doc(alias = "MSG_SUCCESS")]
    Success = 100,
    /// Receiver deleted a file (`MSG_DELETED`).
    #[doc(alias = "MSG_DELETED")]
    Deleted = 101,
    /// Sender could not open a file (`MSG_NO_SEND`).
    #[doc(alias = "MSG_NO_SEND")]
    NoSend = 102,
}

impl MessageCode {
    /// Maps a raw code back to its variant.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::Data,
            1 => Self::ErrorXfer,
            2 => Self::Info,
            3 => Self::Error,
            4 => Self::Warning,
            5 => Self::ErrorSocket,
            6 => Self::Log,
            7 => Self::Client,
            8 => Self::ErrorUtf8,
            9 => Self::Redo,
            10 => Self::Stats,
            22 => Self::IoError,
            33 => Self::IoTimeout,
            42 => Self::NoOp,
            86 => Self::ErrorExit,
            100 => Self::Success,
            101 => Self::Deleted,
            102 => Self::NoSend,
            _ => return None,
        })
    }

    /// Returns the raw code.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns `true` for codes whose payload is a human readable log line.
    #[must_use]
    pub const fn is_logging(self) -> bool {
        matches!(
            self,
            Self::ErrorXfer
                | Self::Info
                | Self::Error
                | Self::Warning
                | Self::ErrorSocket
                | Self::Log
                | Self::Client
                | Self::ErrorUtf8
        )
    }

    /// Upstream identifier, e.g. `MSG_DATA`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Data => "MSG_DATA",
            Self::ErrorXfer => "MSG_ERROR_XFER",
            Self::Info => "MSG_INFO",
            Self::Error => "MSG_ERROR",
            Self::Warning => "MSG_WARNING",
            Self::ErrorSocket => "MSG_ERROR_SOCKET",
            Self::Log => "MSG_LOG",
            Self::Client => "MSG_CLIENT",
            Self::ErrorUtf8 => "MSG_ERROR_UTF8",
            Self::Redo => "MSG_REDO",
            Self::Stats => "MSG_STATS",
            Self::IoError => "MSG_IO_ERROR",
            Self::IoTimeout => "MSG_IO_TIMEOUT",
            Self::NoOp => "MSG_NOOP",
            Self::ErrorExit => "MSG_ERROR_EXIT",
            Self::Success => "MSG_SUCCESS",
            Self::Deleted => "MSG_DELETED",
            Self::NoSend => "MSG_NO_SEND",
        }
    }
}

impl fmt::Display for MessageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
