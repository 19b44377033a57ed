use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::PathBuf;

use md5::{Digest, Md5};
use protocol::flist::{FileEntry, FileListWriter, sort_and_dedup};
use protocol::{FILE_LIST_PARTITION_LIMIT, write_varint};
use tracing::debug;

use super::access::FileAccess;
use super::error::CommandError;
use crate::exit_code::ExitCode;
use crate::files::{FileBoundaries, TrackedFiles};
use crate::interrupt::CancellationFlag;
use crate::request::{RequestData, RsyncOption};

/// A file-list entry together with what backs it on disk.
#[derive(Clone, Debug)]
pub(crate) struct ServedFile {
    pub(crate) entry: FileEntry,
    pub(crate) disk_path: PathBuf,
    pub(crate) range: FileBoundaries,
}

/// Resolves every requested path and returns the entries in wire order.
pub(crate) fn build(
    request: &RequestData,
    tracked: &TrackedFiles,
    access: &dyn FileAccess,
    interrupt: &CancellationFlag,
) -> Result<Vec<ServedFile>, CommandError> {
    let preserve_uid = request.has(RsyncOption::Owner);
    let preserve_gid = request.has(RsyncOption::Group);
    let with_checksum = request.has(RsyncOption::Checksum);

    let mut entries = Vec::with_capacity(request.files().len());
    let mut backing: HashMap<Vec<u8>, (PathBuf, FileBoundaries)> = HashMap::new();

    for path in request.files() {
        interrupt.check()?;
        let file = tracked.lookup(path).ok_or_else(|| {
            CommandError::rsync(ExitCode::FileSelect, format!("file is not tracked: {path}"))
        })?;
        let name = entry_name(path).ok_or_else(|| {
            CommandError::rsync(ExitCode::FileSelect, format!("invalid file name: {path}"))
        })?;

        let metadata = access.metadata(file.disk_path()).map_err(|err| {
            CommandError::rsync(ExitCode::FileSelect, format!("cannot stat {path}: {err}"))
        })?;
        if !metadata.is_regular() {
            return Err(CommandError::rsync(
                ExitCode::FileSelect,
                format!("not a regular file: {path}"),
            ));
        }

        let range = file.boundaries().clamp_to(metadata.len);
        debug!(
            target: "rsynk::sender",
            path = path.as_str(),
            offset = range.offset(),
            length = range.length(),
            "serving file"
        );

        let mut entry = FileEntry::new(
            name.as_bytes(),
            range.length() as i64,
            metadata.mtime,
            metadata.mode,
        );
        if preserve_uid {
            entry.uid = metadata.uid;
        }
        if preserve_gid {
            entry.gid = metadata.gid;
        }
        if with_checksum {
            entry.checksum = Some(range_digest(access, file.disk_path(), range)?);
        }

        backing
            .entry(entry.name.clone())
            .or_insert_with(|| (file.disk_path().to_path_buf(), range));
        entries.push(entry);
    }

    Ok(sort_and_dedup(entries)
        .into_iter()
        .filter_map(|entry| {
            let (disk_path, range) = backing.remove(&entry.name)?;
            Some(ServedFile {
                entry,
                disk_path,
                range,
            })
        })
        .collect())
}

/// Writes the list, its terminator and the (empty) id lists.
pub(crate) fn send<W: Write>(
    writer: &mut W,
    files: &[ServedFile],
    request: &RequestData,
) -> Result<(), CommandError> {
    let preserve_uid = request.has(RsyncOption::Owner);
    let preserve_gid = request.has(RsyncOption::Group);
    let mut list = FileListWriter::new(preserve_uid, preserve_gid);

    for file in files {
        list.write_entry(writer, &file.entry)?;
        if list.written() % FILE_LIST_PARTITION_LIMIT == 0 {
            writer.flush()?;
        }
    }
    list.write_end(writer)?;

    if !request.has(RsyncOption::NumericIds) {
        if preserve_uid {
            write_varint(writer, 0)?;
        }
        if preserve_gid {
            write_varint(writer, 0)?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Streams the served range through MD5.
pub(crate) fn range_digest(
    access: &dyn FileAccess,
    disk_path: &std::path::Path,
    range: FileBoundaries,
) -> Result<[u8; 16], CommandError> {
    let read_failed = |err: std::io::Error| {
        CommandError::rsync(
            ExitCode::FileIo,
            format!("failed to read {}: {err}", disk_path.display()),
        )
    };
    let mut source = access
        .open_at(disk_path, range.offset())
        .map_err(read_failed)?
        .take(range.length());
    let mut hasher = Md5::new();
    std::io::copy(&mut source, &mut hasher).map_err(read_failed)?;
    let mut digest = [0u8; 16];
    digest.copy_from_slice(&hasher.finalize());
    Ok(digest)
}

/// Last component of the logical path, which is what the client stores.
fn entry_name(path: &str) -> Option<&str> {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}
