#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Programmatic entry points for hosting an rsynk sender.
//!
//! Two ways to serve files are offered:
//!
//! - [`Rsynk`] runs inside a host application. The host registers files,
//!   and an [`SshTransport`] it supplies feeds exec channels into the
//!   server's [`CommandFactory`].
//! - [`run_exec`] serves a single command line over caller-provided streams,
//!   for forced-command setups where sshd already owns the connection.
//!
//! # Examples
//!
//! ```
//! use std::io;
//! use std::sync::Arc;
//!
//! use rsynk_embedding::{
//!     CommandFactory, ExitCode, FileBoundaries, Rsynk, RsynkFile, SshSettings, SshTransport,
//!     run_exec,
//! };
//!
//! struct NoNetwork;
//!
//! impl SshTransport for NoNetwork {
//!     fn start(&mut self, _: &SshSettings, _: Arc<CommandFactory>) -> io::Result<()> {
//!         Ok(())
//!     }
//!
//!     fn stop(&mut self) -> io::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let server = Rsynk::builder()
//!     .port(2222)
//!     .server_keys(["/etc/rsynk/host_ed25519"])
//!     .build(NoNetwork)
//!     .unwrap();
//! server.track_file(
//!     RsynkFile::new("logs/app.log", "/var/log/app.log")
//!         .with_boundaries(FileBoundaries::new(0, 1 << 20)),
//! );
//! assert_eq!(server.tracked_files().len(), 1);
//!
//! let code = run_exec(
//!     &server.command_factory(),
//!     "cat /etc/passwd",
//!     io::empty(),
//!     io::sink(),
//!     io::sink(),
//! );
//! assert_eq!(code, ExitCode::StreamIo);
//! ```

mod exec;
mod rsynk;
mod settings;
mod transport;

pub use exec::run_exec;
pub use rsynk::{Rsynk, RsynkBuilder, RsynkError};
pub use server::{CommandFactory, ExitCode, ServerConfig};
pub use settings::SshSettings;
pub use transfer::files::{FileBoundaries, FileBoundariesProvider, RsynkFile, TrackedFiles};
pub use transport::SshTransport;
