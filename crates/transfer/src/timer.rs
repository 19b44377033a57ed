//! Elapsed-time measurement for command diagnostics and transfer stats.

use std::time::{Duration, Instant};

const MIN_ELAPSED: Duration = Duration::from_millis(1);

/// Wall-clock timer reporting at least one millisecond.
///
/// rsync clients divide by the file-list times in the stats block, so a
/// zero reading is never produced.
#[derive(Clone, Copy, Debug)]
pub struct CommandExecutionTimer {
    started: Instant,
}

impl CommandExecutionTimer {
    /// Starts timing now.
    #[must_use]
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Time since [`start`](Self::start), never below 1 ms.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed().max(MIN_ELAPSED)
    }

    /// [`elapsed`](Self::elapsed) in whole milliseconds.
    #[must_use]
    pub fn elapsed_millis(&self) -> u64 {
        u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}
