//! Files the server is willing to hand out.
//!
//! A host registers [`RsynkFile`]s in a shared [`TrackedFiles`] registry.
//! Each file carries a [`FileBoundariesProvider`] that is asked for the byte
//! range to serve on every request, after the registry lock is released.

mod boundaries;
mod file;
mod registry;

#[cfg(test)]
mod tests;

pub use boundaries::{FileBoundaries, FileBoundariesProvider};
pub use file::RsynkFile;
pub use registry::TrackedFiles;
