//! Lifecycle of one exec-channel command.
//!
//! An [`ExecCommand`] moves through [`CommandState`]s held in an atomic
//! shared with its worker job. Every transition into a terminal state is a
//! compare-and-swap, and only the thread that wins it may touch the streams
//! or call the [`ExitCallback`]. That keeps the callback to at most one call
//! even when [`ExecCommand::destroy`] races a finishing job.

use std::any::Any;
use std::fmt;
use std::io::{self, Read, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::{debug, error, info, warn};
use transfer::files::TrackedFiles;
use transfer::request::RequestData;
use transfer::{CancellationFlag, Command, CommandExecutionTimer};

use crate::config::ServerConfig;
use crate::exit_code::{ExitCode, exit_code_for};
use crate::pool::WorkerPool;
use crate::resolver::AllCommandsResolver;

const HARNESS: &str = "rsynk::harness";

/// Receives the final exit code of a command.
pub trait ExitCallback: Send + Sync {
    /// Called once, after the command has stopped using its streams.
    /// `message` carries the error text for failures.
    fn on_exit(&self, code: ExitCode, message: Option<&str>);
}

impl<F> ExitCallback for F
where
    F: Fn(ExitCode, Option<&str>) + Send + Sync,
{
    fn on_exit(&self, code: ExitCode, message: Option<&str>) {
        self(code, message);
    }
}

/// Lifecycle states of an [`ExecCommand`].
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CommandState {
    /// Streams and callback may still be configured.
    Created = 0,
    /// Resolved and queued on the worker pool.
    Started = 1,
    /// Executing on a worker thread.
    Running = 2,
    /// Finished successfully.
    Completed = 3,
    /// Finished with an error, already reported.
    Failed = 4,
    /// Cancelled by [`ExecCommand::destroy`].
    Destroyed = 5,
}

impl CommandState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Created,
            1 => Self::Started,
            2 => Self::Running,
            3 => Self::Completed,
            4 => Self::Failed,
            _ => Self::Destroyed,
        }
    }

    /// Whether no further transition is possible.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Destroyed)
    }
}

impl fmt::Display for CommandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Started => "started",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

/// Creates [`ExecCommand`]s that share a resolver and a worker pool.
pub struct CommandFactory {
    resolver: Arc<AllCommandsResolver>,
    pool: Arc<WorkerPool>,
    active: Arc<DashMap<u64, String>>,
    next_id: AtomicU64,
}

impl CommandFactory {
    /// Builds a factory and spawns its worker pool.
    pub fn new(resolver: AllCommandsResolver, config: &ServerConfig) -> io::Result<Self> {
        let pool = WorkerPool::new(config.command_workers, config.worker_thread_name.clone())?;
        Ok(Self {
            resolver: Arc::new(resolver),
            pool: Arc::new(pool),
            active: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(1),
        })
    }

    /// Factory over the standard command families, serving `files`.
    pub fn for_tracked_files(files: Arc<TrackedFiles>, config: &ServerConfig) -> io::Result<Self> {
        Self::new(AllCommandsResolver::for_tracked_files(files), config)
    }

    /// Wraps `command_line` in a new, unstarted command.
    pub fn create_command(&self, command_line: impl Into<String>) -> ExecCommand {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        ExecCommand {
            invocation: Arc::new(Invocation {
                id,
                command_line: command_line.into(),
                state: AtomicU8::new(CommandState::Created as u8),
                cancel: Arc::new(CancellationFlag::new()),
                active: Arc::clone(&self.active),
            }),
            resolver: Arc::clone(&self.resolver),
            pool: Arc::clone(&self.pool),
            input: None,
            output: None,
            error: None,
            exit_callback: None,
        }
    }

    /// Invocations that have started and not yet finished, as
    /// `(invocation id, command line)` pairs sorted by id.
    pub fn active_commands(&self) -> Vec<(u64, String)> {
        let mut active: Vec<_> = self
            .active
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        active.sort_unstable_by_key(|(id, _)| *id);
        active
    }

    /// The worker pool commands run on.
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }
}

impl fmt::Debug for CommandFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandFactory")
            .field("resolver", &self.resolver)
            .field("pool", &self.pool)
            .field("active", &self.active.len())
            .finish_non_exhaustive()
    }
}

/// State shared between an [`ExecCommand`] and its worker job.
struct Invocation {
    id: u64,
    command_line: String,
    state: AtomicU8,
    cancel: Arc<CancellationFlag>,
    active: Arc<DashMap<u64, String>>,
}

impl Invocation {
    fn state(&self) -> CommandState {
        CommandState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn transition(&self, from: CommandState, to: CommandState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn destroy(&self) -> bool {
        let mut current = self.state();
        loop {
            if current.is_terminal() {
                return false;
            }
            match self.state.compare_exchange(
                current as u8,
                CommandState::Destroyed as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => current = CommandState::from_u8(actual),
            }
        }
        self.cancel.cancel();
        self.active.remove(&self.id);
        true
    }

    fn destroy_logged(&self) {
        if self.destroy() {
            info!(target: HARNESS, invocation = self.id, "command destroyed");
        } else {
            debug!(
                target: HARNESS,
                invocation = self.id,
                state = %self.state(),
                "destroy after completion ignored"
            );
        }
    }
}

struct Streams {
    input: Box<dyn Read + Send>,
    output: Box<dyn Write + Send>,
    error: Box<dyn Write + Send>,
}

/// One command line received on an exec channel.
///
/// Configure the three streams and the exit callback, then call
/// [`start`](Self::start). The command runs on a pool thread; `start`
/// never blocks on it.
pub struct ExecCommand {
    invocation: Arc<Invocation>,
    resolver: Arc<AllCommandsResolver>,
    pool: Arc<WorkerPool>,
    input: Option<Box<dyn Read + Send>>,
    output: Option<Box<dyn Write + Send>>,
    error: Option<Box<dyn Write + Send>>,
    exit_callback: Option<Arc<dyn ExitCallback>>,
}

impl ExecCommand {
    /// Sets the stream the client writes to.
    pub fn set_input_stream(&mut self, input: Box<dyn Read + Send>) {
        self.input = Some(input);
    }

    /// Sets the stream carrying protocol output to the client.
    pub fn set_output_stream(&mut self, output: Box<dyn Write + Send>) {
        self.output = Some(output);
    }

    /// Sets the stream carrying diagnostics to the client.
    pub fn set_error_stream(&mut self, error: Box<dyn Write + Send>) {
        self.error = Some(error);
    }

    /// Sets the callback told about the exit code.
    pub fn set_exit_callback(&mut self, callback: Arc<dyn ExitCallback>) {
        self.exit_callback = Some(callback);
    }

    /// Identifier of this invocation within its factory.
    pub fn invocation_id(&self) -> u64 {
        self.invocation.id
    }

    /// The raw command line.
    pub fn command_line(&self) -> &str {
        &self.invocation.command_line
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CommandState {
        self.invocation.state()
    }

    /// Resolves the command line and queues the command.
    ///
    /// A line that does not resolve fails with [`ExitCode::StreamIo`]; a
    /// missing stream fails with [`ExitCode::SocketIo`]. Both are reported
    /// through the exit callback before this returns. Starting twice, or
    /// after [`destroy`](Self::destroy), does nothing.
    pub fn start(&mut self) {
        let id = self.invocation.id;
        if self.state() != CommandState::Created {
            debug!(target: HARNESS, invocation = id, state = %self.state(), "start ignored");
            return;
        }

        let args: Vec<String> = self
            .invocation
            .command_line
            .split(' ')
            .filter(|token| !token.is_empty())
            .map(str::to_owned)
            .collect();

        let resolved = match self.resolver.resolve(&args) {
            Ok(resolved) => resolved,
            Err(resolve_error) => {
                let message = match std::error::Error::source(&resolve_error) {
                    Some(cause) => format!("{resolve_error}: {cause}"),
                    None => resolve_error.to_string(),
                };
                warn!(target: HARNESS, invocation = id, error = %message, "command rejected");
                self.fail_early(ExitCode::StreamIo, message);
                return;
            }
        };

        if self.input.is_none() || self.output.is_none() || self.error.is_none() {
            warn!(target: HARNESS, invocation = id, "command streams are not configured");
            self.fail_early(
                ExitCode::SocketIo,
                "command streams are not configured".to_owned(),
            );
            return;
        }
        let (Some(input), Some(output), Some(error)) =
            (self.input.take(), self.output.take(), self.error.take())
        else {
            return;
        };

        // Inserted ahead of the transition: destroy removes it once the
        // state leaves Created, a lost transition removes it here.
        self.invocation
            .active
            .insert(id, self.invocation.command_line.clone());
        if !self
            .invocation
            .transition(CommandState::Created, CommandState::Started)
        {
            self.invocation.active.remove(&id);
            return;
        }

        let (command, request) = resolved.into_parts();
        info!(
            target: HARNESS,
            invocation = id,
            command = command.name(),
            "starting command"
        );
        let job = Job {
            invocation: Arc::clone(&self.invocation),
            command,
            request,
            streams: Streams {
                input,
                output,
                error,
            },
            exit_callback: self.exit_callback.take(),
        };

        let cancel = Arc::clone(&self.invocation.cancel);
        if let Err(closed) = self.pool.submit_with_flag(cancel, move |flag| job.run(flag)) {
            error!(target: HARNESS, invocation = id, error = %closed, "cannot queue command");
            // The job, streams and callback were dropped with the rejected task.
            self.invocation.destroy();
        }
    }

    /// Cancels the command. A queued command never runs; a running one stops
    /// at its next cancellation point. No exit code is reported for a
    /// destroyed command.
    pub fn destroy(&self) {
        self.invocation.destroy_logged();
    }

    /// A handle that can destroy this command from another thread.
    pub fn handle(&self) -> CommandHandle {
        CommandHandle {
            invocation: Arc::clone(&self.invocation),
        }
    }

    fn fail_early(&mut self, code: ExitCode, message: String) {
        if !self
            .invocation
            .transition(CommandState::Created, CommandState::Failed)
        {
            return;
        }
        if let Some(error) = self.error.as_mut() {
            report_to_stream(error.as_mut(), &message);
        }
        if let Some(output) = self.output.as_mut() {
            let _ = output.flush();
        }
        if let Some(callback) = self.exit_callback.take() {
            callback.on_exit(code, Some(&message));
        }
    }
}

impl fmt::Debug for ExecCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecCommand")
            .field("invocation", &self.invocation.id)
            .field("command_line", &self.invocation.command_line)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Shareable handle to a started [`ExecCommand`].
///
/// The SSH layer typically keeps one of these to tear the command down when
/// the channel closes, while the command itself lives on the channel.
#[derive(Clone)]
pub struct CommandHandle {
    invocation: Arc<Invocation>,
}

impl CommandHandle {
    /// See [`ExecCommand::destroy`].
    pub fn destroy(&self) {
        self.invocation.destroy_logged();
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CommandState {
        self.invocation.state()
    }

    /// Identifier of the invocation.
    pub fn invocation_id(&self) -> u64 {
        self.invocation.id
    }
}

impl fmt::Debug for CommandHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHandle")
            .field("invocation", &self.invocation.id)
            .field("state", &self.state())
            .finish()
    }
}

/// Work queued for one started command.
struct Job {
    invocation: Arc<Invocation>,
    command: Arc<dyn Command>,
    request: RequestData,
    streams: Streams,
    exit_callback: Option<Arc<dyn ExitCallback>>,
}

impl Job {
    fn run(mut self, cancel: &CancellationFlag) {
        let id = self.invocation.id;
        if !self
            .invocation
            .transition(CommandState::Started, CommandState::Running)
        {
            self.invocation.active.remove(&id);
            return;
        }

        let timer = CommandExecutionTimer::start();
        let streams = &mut self.streams;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.command.execute(
                &self.request,
                streams.input.as_mut(),
                streams.output.as_mut(),
                streams.error.as_mut(),
                cancel,
            )
        }));
        let elapsed_ms = timer.elapsed_millis();

        match outcome {
            Ok(Ok(())) => {
                info!(target: HARNESS, invocation = id, elapsed_ms, "command completed");
                self.finish(CommandState::Completed, ExitCode::Ok, None);
            }
            Ok(Err(failure)) => match exit_code_for(&failure) {
                Some(code) => {
                    let message = failure.to_string();
                    if code == ExitCode::StreamIo {
                        error!(
                            target: HARNESS,
                            invocation = id,
                            elapsed_ms,
                            error = %message,
                            "command failed"
                        );
                    } else {
                        warn!(
                            target: HARNESS,
                            invocation = id,
                            exit_code = code.as_i32(),
                            elapsed_ms,
                            error = %message,
                            "command failed"
                        );
                    }
                    self.finish(CommandState::Failed, code, Some(message));
                }
                None if cancel.is_cancelled()
                    || self.invocation.state() == CommandState::Destroyed =>
                {
                    debug!(target: HARNESS, invocation = id, elapsed_ms, "command interrupted");
                    self.invocation.destroy();
                }
                None => {
                    let message = failure.to_string();
                    error!(
                        target: HARNESS,
                        invocation = id,
                        elapsed_ms,
                        error = %message,
                        "command interrupted without being destroyed"
                    );
                    self.finish(CommandState::Failed, ExitCode::StreamIo, Some(message));
                }
            },
            Err(payload) => {
                let message = format!("command panicked: {}", panic_message(payload.as_ref()));
                error!(target: HARNESS, invocation = id, elapsed_ms, error = %message, "command failed");
                self.finish(CommandState::Failed, ExitCode::StreamIo, Some(message));
            }
        }
    }

    fn finish(mut self, state: CommandState, code: ExitCode, message: Option<String>) {
        if !self.invocation.transition(CommandState::Running, state) {
            debug!(
                target: HARNESS,
                invocation = self.invocation.id,
                "command destroyed before it could report"
            );
            return;
        }
        if let Some(message) = &message {
            report_to_stream(self.streams.error.as_mut(), message);
        }
        let _ = self.streams.output.flush();
        self.invocation.active.remove(&self.invocation.id);
        if let Some(callback) = self.exit_callback.take() {
            callback.on_exit(code, message.as_deref());
        }
    }
}

fn report_to_stream(stream: &mut dyn Write, message: &str) {
    let _ = writeln!(stream, "{message}");
    let _ = stream.flush();
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
