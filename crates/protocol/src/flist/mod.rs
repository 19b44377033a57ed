//! File-list encoding for the sender.
//!
//! The sender describes every file it offers before any data flows. Entries
//! are delta-compressed against the previous entry (shared name prefix,
//! repeated mode, time and ownership), terminated by a zero byte, and sorted
//! the same way on both sides so file indices agree.

mod entry;
mod sort;
mod write;

pub mod flags;

pub use entry::FileEntry;
pub use sort::sort_and_dedup;
pub use write::FileListWriter;
