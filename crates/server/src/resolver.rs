//! Mapping of command lines to command implementations.
//!
//! Each command family implements [`CommandsResolver`]. The
//! [`AllCommandsResolver`] asks every family and insists on exactly one
//! match, so an ambiguous line is refused rather than guessed.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;
use transfer::Command;
use transfer::files::TrackedFiles;
use transfer::request::{ArgsParseError, RequestData, RequestParser, RsyncOption};
use transfer::sender::RsyncServerSendCommand;

const RESOLVER: &str = "rsynk::resolver";

/// Failure to turn a command line into a runnable command.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No family, or more than one, claimed the command line.
    #[error("command not found: {}", args.join(" "))]
    CommandNotFound {
        /// The offending command line, split on spaces.
        args: Vec<String>,
    },
    /// A family could not parse the command line.
    #[error("invalid arguments: {}", args.join(" "))]
    InvalidArguments {
        /// The offending command line, split on spaces.
        args: Vec<String>,
        /// Parser diagnostics.
        #[source]
        source: ArgsParseError,
    },
}

/// A command implementation paired with the request it should serve.
pub struct ResolvedCommand {
    command: Arc<dyn Command>,
    request: RequestData,
}

impl ResolvedCommand {
    /// Pairs `command` with `request`.
    pub fn new(command: Arc<dyn Command>, request: RequestData) -> Self {
        Self { command, request }
    }

    /// The command to run.
    pub fn command(&self) -> &Arc<dyn Command> {
        &self.command
    }

    /// The parsed request.
    pub const fn request(&self) -> &RequestData {
        &self.request
    }

    /// Splits into the command and the request.
    pub fn into_parts(self) -> (Arc<dyn Command>, RequestData) {
        (self.command, self.request)
    }
}

impl fmt::Debug for ResolvedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCommand")
            .field("command", &self.command.name())
            .field("request", &self.request)
            .finish()
    }
}

/// One family of commands.
pub trait CommandsResolver: Send + Sync {
    /// Returns the matching command, `Ok(None)` when no command of this
    /// family serves the request, or an error when the line cannot be parsed.
    fn resolve(&self, args: &[String]) -> Result<Option<ResolvedCommand>, ResolveError>;
}

/// Selects a command from a parsed request.
pub type Predicate = Box<dyn Fn(&RequestData) -> bool + Send + Sync>;

/// Resolver for `rsync --server ...` invocations.
///
/// Every parser failure, including a program that is not rsync, becomes
/// [`ResolveError::InvalidArguments`]. Entries are checked in insertion
/// order and the first matching predicate wins.
pub struct RsyncCommandsResolver {
    commands: Vec<(Arc<dyn Command>, Predicate)>,
}

impl RsyncCommandsResolver {
    /// Builds the default table: the sender command for
    /// `--server --sender` requests that are not daemon requests.
    pub fn new(files: Arc<TrackedFiles>) -> Self {
        let mut resolver = Self::empty();
        resolver.register(
            Arc::new(RsyncServerSendCommand::new(files)),
            Box::new(is_server_sender),
        );
        resolver
    }

    /// A resolver with no commands.
    pub fn empty() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Appends `command`, selected when `predicate` holds.
    pub fn register(&mut self, command: Arc<dyn Command>, predicate: Predicate) {
        self.commands.push((command, predicate));
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no command is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl CommandsResolver for RsyncCommandsResolver {
    fn resolve(&self, args: &[String]) -> Result<Option<ResolvedCommand>, ResolveError> {
        let request =
            RequestParser::parse_command(args).map_err(|source| ResolveError::InvalidArguments {
                args: args.to_vec(),
                source,
            })?;

        let found = self
            .commands
            .iter()
            .find(|(_, predicate)| predicate(&request))
            .map(|(command, _)| Arc::clone(command));
        Ok(found.map(|command| {
            debug!(target: RESOLVER, command = command.name(), "resolved rsync command");
            ResolvedCommand::new(command, request)
        }))
    }
}

impl fmt::Debug for RsyncCommandsResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.commands.iter().map(|(c, _)| c.name()).collect();
        f.debug_struct("RsyncCommandsResolver")
            .field("commands", &names)
            .finish()
    }
}

fn is_server_sender(request: &RequestData) -> bool {
    request.has(RsyncOption::Server)
        && request.has(RsyncOption::Sender)
        && !request.has(RsyncOption::Daemon)
}

/// Resolver over every command family.
pub struct AllCommandsResolver {
    families: Vec<Box<dyn CommandsResolver>>,
}

impl AllCommandsResolver {
    /// Resolver over the given families, asked in order.
    pub fn new(families: Vec<Box<dyn CommandsResolver>>) -> Self {
        Self { families }
    }

    /// The standard family set, serving files from `files`.
    pub fn for_tracked_files(files: Arc<TrackedFiles>) -> Self {
        Self::new(vec![Box::new(RsyncCommandsResolver::new(files))])
    }

    /// Resolves `args`, requiring exactly one family to claim them.
    pub fn resolve(&self, args: &[String]) -> Result<ResolvedCommand, ResolveError> {
        let mut matched = Vec::with_capacity(1);
        for family in &self.families {
            if let Some(resolved) = family.resolve(args)? {
                matched.push(resolved);
            }
        }

        if matched.len() == 1 {
            if let Some(resolved) = matched.pop() {
                return Ok(resolved);
            }
        }
        debug!(
            target: RESOLVER,
            matches = matched.len(),
            "no unique command for request"
        );
        Err(ResolveError::CommandNotFound {
            args: args.to_vec(),
        })
    }
}

impl fmt::Debug for AllCommandsResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllCommandsResolver")
            .field("families", &self.families.len())
            .finish()
    }
}
