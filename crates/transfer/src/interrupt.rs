//! Cancellation support for running commands.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::sender::CommandError;

/// A thread-safe cancellation flag shared between the harness and a job.
///
/// The flag starts cleared; once raised it stays raised.
#[derive(Debug, Default)]
pub struct CancellationFlag(AtomicBool);

impl CancellationFlag {
    /// Creates a cleared flag.
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Cancellation point: fails with [`CommandError::Interrupted`] once the
    /// flag is raised.
    pub fn check(&self) -> Result<(), CommandError> {
        if self.is_cancelled() {
            Err(CommandError::Interrupted)
        } else {
            Ok(())
        }
    }
}
