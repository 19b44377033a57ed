use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use server::{CommandFactory, ServerConfig};
use thiserror::Error;
use tracing::{info, warn};
use transfer::files::{RsynkFile, TrackedFiles};

use crate::settings::SshSettings;
use crate::transport::SshTransport;

const EMBEDDING: &str = "rsynk::embedding";

/// Failure to bring up an embedded server.
#[derive(Debug, Error)]
pub enum RsynkError {
    /// The builder was given no host key file.
    #[error("at least one server key file is required")]
    MissingServerKeys,
    /// A builder value is out of range.
    #[error("invalid setting {name}: {reason}")]
    InvalidSetting {
        /// Builder method name.
        name: &'static str,
        /// What is wrong with the value.
        reason: &'static str,
    },
    /// The command worker pool could not be spawned.
    #[error("failed to spawn command workers: {0}")]
    Workers(#[source] io::Error),
    /// The transport failed to start.
    #[error("failed to start ssh transport: {0}")]
    Transport(#[source] io::Error),
}

/// Configures an embedded [`Rsynk`] server.
#[derive(Clone, Debug, Default)]
pub struct RsynkBuilder {
    settings: SshSettings,
}

impl RsynkBuilder {
    /// Sets the listening port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.settings.port = port;
        self
    }

    /// Sets the number of network threads used by the transport.
    #[must_use]
    pub fn nio_workers(mut self, workers: usize) -> Self {
        self.settings.nio_workers = workers;
        self
    }

    /// Sets the number of threads running commands.
    #[must_use]
    pub fn command_workers(mut self, workers: usize) -> Self {
        self.settings.command_workers = workers;
        self
    }

    /// Sets how long an idle connection is kept open.
    #[must_use]
    pub fn idle_connection_timeout(mut self, timeout: Duration) -> Self {
        self.settings.idle_connection_timeout = timeout;
        self
    }

    /// Sets the number of authentication attempts per connection.
    #[must_use]
    pub fn max_auth_attempts(mut self, attempts: u32) -> Self {
        self.settings.max_auth_attempts = attempts;
        self
    }

    /// Sets the host key files.
    #[must_use]
    pub fn server_keys<I, P>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.settings.server_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// The settings collected so far.
    pub const fn settings(&self) -> &SshSettings {
        &self.settings
    }

    /// Validates the settings, spawns the command workers and starts
    /// `transport`.
    pub fn build<T>(self, transport: T) -> Result<Rsynk, RsynkError>
    where
        T: SshTransport + 'static,
    {
        let settings = self.validated()?;
        let files = Arc::new(TrackedFiles::new());
        let config = ServerConfig::default().with_command_workers(settings.command_workers);
        let factory = CommandFactory::for_tracked_files(Arc::clone(&files), &config)
            .map_err(RsynkError::Workers)?;
        let factory = Arc::new(factory);

        let mut transport: Box<dyn SshTransport> = Box::new(transport);
        transport
            .start(&settings, Arc::clone(&factory))
            .map_err(RsynkError::Transport)?;
        info!(
            target: EMBEDDING,
            port = settings.port,
            command_workers = settings.command_workers,
            "rsynk server started"
        );

        Ok(Rsynk {
            settings,
            files,
            factory,
            transport,
            closed: false,
        })
    }

    fn validated(self) -> Result<SshSettings, RsynkError> {
        let settings = self.settings;
        if settings.server_keys.is_empty() {
            return Err(RsynkError::MissingServerKeys);
        }
        if settings.port == 0 {
            return Err(RsynkError::InvalidSetting {
                name: "port",
                reason: "must be non-zero",
            });
        }
        if settings.nio_workers == 0 {
            return Err(RsynkError::InvalidSetting {
                name: "nio_workers",
                reason: "must be at least 1",
            });
        }
        if settings.command_workers == 0 {
            return Err(RsynkError::InvalidSetting {
                name: "command_workers",
                reason: "must be at least 1",
            });
        }
        if settings.max_auth_attempts == 0 {
            return Err(RsynkError::InvalidSetting {
                name: "max_auth_attempts",
                reason: "must be at least 1",
            });
        }
        Ok(settings)
    }
}

/// A running embedded server.
///
/// Files become downloadable once tracked. Dropping the server closes it.
pub struct Rsynk {
    settings: SshSettings,
    files: Arc<TrackedFiles>,
    factory: Arc<CommandFactory>,
    transport: Box<dyn SshTransport>,
    closed: bool,
}

impl Rsynk {
    /// A builder with default settings.
    pub fn builder() -> RsynkBuilder {
        RsynkBuilder::default()
    }

    /// Makes `file` available to clients, replacing any file at the same path.
    pub fn track_file(&self, file: RsynkFile) -> &Self {
        self.files.add([file]);
        self
    }

    /// Makes all `files` available in one step.
    pub fn track_files(&self, files: impl IntoIterator<Item = RsynkFile>) -> &Self {
        self.files.add(files);
        self
    }

    /// Withdraws every tracked file.
    pub fn stop_tracking_all_files(&self) {
        self.files.remove_all();
    }

    /// The registry clients are served from.
    pub fn tracked_files(&self) -> Arc<TrackedFiles> {
        Arc::clone(&self.files)
    }

    /// The factory the transport feeds exec channels into.
    pub fn command_factory(&self) -> Arc<CommandFactory> {
        Arc::clone(&self.factory)
    }

    /// Settings the server was started with.
    pub const fn settings(&self) -> &SshSettings {
        &self.settings
    }

    /// Stops the transport. Closing twice is a no-op.
    pub fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.transport.stop()?;
        info!(target: EMBEDDING, port = self.settings.port, "rsynk server stopped");
        Ok(())
    }
}

impl Drop for Rsynk {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            warn!(target: EMBEDDING, %error, "failed to stop ssh transport");
        }
    }
}

impl fmt::Debug for Rsynk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rsynk")
            .field("settings", &self.settings)
            .field("tracked", &self.files.len())
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
