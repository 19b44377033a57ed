use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::time::UNIX_EPOCH;

/// The attributes of a file that end up in the file list.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FileMetadata {
    /// Current size in bytes.
    pub len: u64,
    /// Modification time in seconds since the epoch.
    pub mtime: i64,
    /// Unix mode including the file type bits.
    pub mode: u32,
    /// Owner id.
    pub uid: u32,
    /// Group id.
    pub gid: u32,
}

impl FileMetadata {
    /// Whether the mode describes a regular file.
    #[must_use]
    pub const fn is_regular(&self) -> bool {
        self.mode & S_IFMT == S_IFREG
    }
}

const S_IFMT: u32 = 0o170_000;
const S_IFREG: u32 = 0o100_000;

/// Filesystem seam used by the sender.
pub trait FileAccess: Send + Sync {
    /// Stats `path`, following symlinks.
    fn metadata(&self, path: &Path) -> io::Result<FileMetadata>;

    /// Opens `path` positioned at `offset`.
    fn open_at(&self, path: &Path, offset: u64) -> io::Result<Box<dyn Read + Send>>;
}

/// [`FileAccess`] backed by `std::fs`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdFileAccess;

impl FileAccess for StdFileAccess {
    fn metadata(&self, path: &Path) -> io::Result<FileMetadata> {
        let metadata = std::fs::metadata(path)?;
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |since| since.as_secs() as i64);
        let (mode, uid, gid) = ownership(&metadata);
        Ok(FileMetadata {
            len: metadata.len(),
            mtime,
            mode,
            uid,
            gid,
        })
    }

    fn open_at(&self, path: &Path, offset: u64) -> io::Result<Box<dyn Read + Send>> {
        let mut file = File::open(path)?;
        if offset > 0 {
            file.seek(SeekFrom::Start(offset))?;
        }
        Ok(Box::new(file))
    }
}

#[cfg(unix)]
fn ownership(metadata: &std::fs::Metadata) -> (u32, u32, u32) {
    use std::os::unix::fs::MetadataExt;
    (metadata.mode(), metadata.uid(), metadata.gid())
}

#[cfg(not(unix))]
fn ownership(metadata: &std::fs::Metadata) -> (u32, u32, u32) {
    let kind = if metadata.is_file() { S_IFREG } else { 0o040_000 };
    let perms = if metadata.permissions().readonly() { 0o444 } else { 0o644 };
    (kind | perms, 0, 0)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn std_access_reports_regular_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"0123456789").unwrap();

        let metadata = StdFileAccess.metadata(file.path()).unwrap();
        assert_eq!(metadata.len, 10);
        assert!(metadata.is_regular());
        assert!(metadata.mtime > 0);
    }

    #[test]
    fn directories_are_not_regular() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!StdFileAccess.metadata(dir.path()).unwrap().is_regular());
    }

    #[test]
    fn open_at_seeks_to_offset() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"0123456789").unwrap();

        let mut rest = String::new();
        StdFileAccess
            .open_at(file.path(), 6)
            .unwrap()
            .read_to_string(&mut rest)
            .unwrap();
        assert_eq!(rest, "6789");
    }
}
