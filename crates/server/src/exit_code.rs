//! Mapping from command failures to client-visible exit codes.

pub use transfer::ExitCode;
use transfer::CommandError;

/// Exit code reported for a failed command, or `None` when the failure must
/// not be reported at all.
///
/// | Error | Exit code |
/// |-------|-----------|
/// | [`CommandError::Rsync`] | the carried code |
/// | [`CommandError::Io`], [`CommandError::Other`] | [`ExitCode::StreamIo`] |
/// | [`CommandError::Interrupted`] | none |
#[must_use]
pub fn exit_code_for(error: &CommandError) -> Option<ExitCode> {
    match error {
        CommandError::Rsync { code, .. } => Some(*code),
        CommandError::Io(_) | CommandError::Other(_) => Some(ExitCode::StreamIo),
        CommandError::Interrupted => None,
    }
}
