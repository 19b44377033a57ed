use std::io::{Read, Write};
use std::sync::Arc;

use server::{CommandFactory, ExitCode};
use tracing::warn;

/// Runs one command line to completion and returns its exit code.
///
/// This is the blocking path for forced-command mode, where sshd has already
/// authenticated the client and execs the server with the channel on stdio.
/// A command destroyed before it reports yields [`ExitCode::StreamIo`].
pub fn run_exec<R, W, E>(
    factory: &CommandFactory,
    command_line: &str,
    stdin: R,
    stdout: W,
    stderr: E,
) -> ExitCode
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
    E: Write + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::bounded(1);
    let mut command = factory.create_command(command_line);
    command.set_input_stream(Box::new(stdin));
    command.set_output_stream(Box::new(stdout));
    command.set_error_stream(Box::new(stderr));
    command.set_exit_callback(Arc::new(move |code: ExitCode, _: Option<&str>| {
        let _ = tx.send(code);
    }));
    command.start();

    rx.recv().unwrap_or_else(|_| {
        warn!(
            target: "rsynk::embedding",
            invocation = command.invocation_id(),
            state = %command.state(),
            "command ended without an exit code"
        );
        ExitCode::StreamIo
    })
}
