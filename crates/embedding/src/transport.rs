use std::io;
use std::sync::Arc;

use server::CommandFactory;

use crate::settings::SshSettings;

/// The SSH server that accepts connections and feeds exec channels to a
/// [`CommandFactory`].
///
/// For every exec request the transport calls
/// [`CommandFactory::create_command`] with the raw command string, wires the
/// channel's streams and exit callback, then starts the command. Closing a
/// channel early should call `destroy` on the command.
pub trait SshTransport: Send {
    /// Begins accepting connections.
    fn start(&mut self, settings: &SshSettings, factory: Arc<CommandFactory>) -> io::Result<()>;

    /// Stops accepting connections and closes open ones.
    fn stop(&mut self) -> io::Result<()>;
}
