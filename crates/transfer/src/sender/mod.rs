//! The rsync sender run for `rsync --server --sender`.
//!
//! [`RsyncServerSendCommand`] follows the server-sender path of rsync 3.x:
//! protocol setup, the filter list, the file list, the send loop, the stats
//! block and the final goodbye. Files come from the [`TrackedFiles`]
//! registry and are read through a [`FileAccess`] implementation.
//!
//! [`TrackedFiles`]: crate::files::TrackedFiles

mod access;
mod command;
mod counting;
mod error;
mod file_list;
mod session;

pub use access::{FileAccess, FileMetadata, StdFileAccess};
pub use command::Command;
pub use error::CommandError;
pub use session::RsyncServerSendCommand;
