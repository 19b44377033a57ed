/// Runtime settings for the execution harness.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    /// Number of worker threads running commands. Zero is treated as one.
    pub command_workers: usize,
    /// Prefix for worker thread names; each thread appends `-<index>`.
    pub worker_thread_name: String,
}

impl ServerConfig {
    /// Default worker thread name prefix.
    pub const DEFAULT_WORKER_THREAD_NAME: &'static str = "ssh-command";

    /// Sets the number of command workers.
    pub fn with_command_workers(mut self, workers: usize) -> Self {
        self.command_workers = workers;
        self
    }

    /// Sets the worker thread name prefix.
    pub fn with_worker_thread_name(mut self, name: impl Into<String>) -> Self {
        self.worker_thread_name = name.into();
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            command_workers: 1,
            worker_thread_name: Self::DEFAULT_WORKER_THREAD_NAME.to_owned(),
        }
    }
}
