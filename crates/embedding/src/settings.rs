use std::path::PathBuf;
use std::time::Duration;

/// Settings handed to an [`SshTransport`](crate::SshTransport) when the
/// embedded server starts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SshSettings {
    /// TCP port the SSH server listens on.
    pub port: u16,
    /// Threads the transport may use for network I/O.
    pub nio_workers: usize,
    /// Threads running exec-channel commands.
    pub command_workers: usize,
    /// Connections idle for longer than this are dropped.
    pub idle_connection_timeout: Duration,
    /// Authentication attempts allowed per connection.
    pub max_auth_attempts: u32,
    /// Host key files, in preference order.
    pub server_keys: Vec<PathBuf>,
    /// Name announced by the transport; contains no spaces.
    pub application_name: &'static str,
}

impl SshSettings {
    /// Default listening port.
    pub const DEFAULT_PORT: u16 = 22;
    /// Default idle timeout.
    pub const DEFAULT_IDLE_CONNECTION_TIMEOUT: Duration = Duration::from_secs(50 * 60);
    /// Default number of authentication attempts.
    pub const DEFAULT_MAX_AUTH_ATTEMPTS: u32 = 2;
    /// Name announced by the transport.
    pub const APPLICATION_NAME: &'static str = "rsynk";
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            port: Self::DEFAULT_PORT,
            nio_workers: 1,
            command_workers: 1,
            idle_connection_timeout: Self::DEFAULT_IDLE_CONNECTION_TIMEOUT,
            max_auth_attempts: Self::DEFAULT_MAX_AUTH_ATTEMPTS,
            server_keys: Vec::new(),
            application_name: Self::APPLICATION_NAME,
        }
    }
}
