use std::io::{Read, Write};

use super::error::CommandError;
use crate::interrupt::CancellationFlag;
use crate::request::RequestData;

/// A protocol command that can serve one exec channel.
///
/// Implementations hold no per-invocation state; the harness calls
/// [`Command::execute`] once per channel on a worker thread and expects it
/// to observe `interrupt` at protocol checkpoints.
pub trait Command: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Runs the command to completion against the channel's streams.
    fn execute(
        &self,
        request: &RequestData,
        input: &mut dyn Read,
        output: &mut dyn Write,
        error: &mut dyn Write,
        interrupt: &CancellationFlag,
    ) -> Result<(), CommandError>;
}
