#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Exec-channel command handling for rsynk.
//!
//! An SSH layer hands this crate one command string and three byte streams
//! per exec channel. The [`CommandFactory`] turns the string into an
//! [`ExecCommand`], which resolves it through the [`AllCommandsResolver`],
//! runs the matching [`Command`](transfer::Command) on a [`WorkerPool`]
//! thread and reports the outcome through an [`ExitCallback`] exactly once.
//!
//! # Examples
//!
//! ```
//! use std::io;
//! use std::sync::Arc;
//! use std::sync::mpsc;
//!
//! use server::{CommandFactory, ExitCode, ServerConfig};
//! use transfer::files::TrackedFiles;
//!
//! let factory = CommandFactory::for_tracked_files(
//!     Arc::new(TrackedFiles::new()),
//!     &ServerConfig::default(),
//! )
//! .unwrap();
//!
//! let (tx, rx) = mpsc::channel();
//! let mut command = factory.create_command("ls -la");
//! command.set_input_stream(Box::new(io::empty()));
//! command.set_output_stream(Box::new(io::sink()));
//! command.set_error_stream(Box::new(io::sink()));
//! command.set_exit_callback(Arc::new(move |code: ExitCode, _: Option<&str>| {
//!     let _ = tx.send(code);
//! }));
//! command.start();
//!
//! assert_eq!(rx.recv().unwrap(), ExitCode::StreamIo);
//! ```

mod config;
mod harness;
mod pool;

pub mod exit_code;
pub mod resolver;


pub use config::ServerConfig;
pub use exit_code::{ExitCode, exit_code_for};
pub use harness::{CommandFactory, CommandHandle, CommandState, ExecCommand, ExitCallback};
pub use pool::{PoolClosed, TaskHandle, WorkerPool};
pub use resolver::{
    AllCommandsResolver, CommandsResolver, Predicate, ResolveError, ResolvedCommand,
    RsyncCommandsResolver,
};
pub use transfer::{CancellationFlag, CommandExecutionTimer};
