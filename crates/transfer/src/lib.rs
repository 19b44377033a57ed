#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Server-side request handling for rsynk.
//!
//! This crate sits between the wire primitives in `protocol` and the
//! execution harness in `server`:
//!
//! - [`request`] parses the `rsync --server ...` command line;
//! - [`files`] holds the registry of files clients may fetch;
//! - [`sender`] runs the rsync sender session for one request.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use transfer::files::{FileBoundaries, RsynkFile, TrackedFiles};
//! use transfer::request::{RequestParser, RsyncOption};
//!
//! let tracked = Arc::new(TrackedFiles::new());
//! tracked.add([RsynkFile::new("logs/app.log", "/var/log/app.log")
//!     .with_boundaries(FileBoundaries::new(0, 4096))]);
//!
//! let request = RequestParser::parse_command(&[
//!     "rsync", "--server", "--sender", "-e.LsfxC", ".", "logs/app.log",
//! ])
//! .unwrap();
//! assert!(request.has(RsyncOption::Sender));
//! assert!(tracked.lookup(&request.files()[0]).is_some());
//! ```

mod exit_code;
mod interrupt;
mod timer;

pub mod files;
pub mod request;
pub mod sender;

pub use exit_code::ExitCode;
pub use interrupt::CancellationFlag;
pub use sender::{Command, CommandError};
pub use timer::CommandExecutionTimer;
