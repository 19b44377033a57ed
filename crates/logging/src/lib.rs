#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! Library crates in the workspace only emit `tracing` events under the
//! `rsynk::*` targets. This crate turns a `-v` count (or `RUST_LOG`) into a
//! subscriber and installs it once per process; binaries call
//! [`init_tracing`] during start-up.
//!
//! # Design
//!
//! [`LogConfig`] carries the verbosity level and an optional log file. When a
//! file is configured all output goes there, so stderr stays free for the
//! rsync client: in forced-command mode the process's stderr is relayed to
//! the remote user.
//!
//! # Examples
//!
//! ```
//! use logging::LogConfig;
//!
//! let config = LogConfig::from_verbose_level(2);
//! assert_eq!(config.default_directive(), "debug");
//! ```

mod config;
mod tracing_bridge;

pub use config::LogConfig;
pub use tracing_bridge::{LoggingError, init_tracing, init_tracing_with_filter};
