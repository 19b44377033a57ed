/// One regular file as described in the file list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileEntry {
    /// Name relative to the transfer root, as raw bytes.
    pub name: Vec<u8>,
    /// Number of bytes that will be sent for this file.
    pub size: i64,
    /// Modification time in seconds since the epoch.
    pub mtime: i64,
    /// Unix mode bits including the file type.
    pub mode: u32,
    /// Owner id, sent when owners are preserved.
    pub uid: u32,
    /// Group id, sent when groups are preserved.
    pub gid: u32,
    /// Whole-file checksum, sent when `--checksum` is active.
    pub checksum: Option<[u8; 16]>,
}

impl FileEntry {
    /// Creates an entry without ownership or checksum data.
    #[must_use]
    pub fn new(name: impl Into<Vec<u8>>, size: i64, mtime: i64, mode: u32) -> Self {
        Self {
            name: name.into(),
            size,
            mtime,
            mode,
            uid: 0,
            gid: 0,
            checksum: None,
        }
    }

    /// Whether the mode describes a directory.
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        self.mode & 0o170_000 == 0o040_000
    }
}
