use std::io::{self, Write};

use super::entry::FileEntry;
use super::flags::{
    XMIT_EXTENDED_FLAGS, XMIT_LONG_NAME, XMIT_SAME_GID, XMIT_SAME_MODE, XMIT_SAME_NAME,
    XMIT_SAME_TIME, XMIT_SAME_UID, XMIT_TOP_DIR,
};
use crate::varint::{write_byte, write_int, write_shortint, write_varint, write_varlong};

/// Longest shared prefix expressible in the one-byte `same_len` field.
const MAX_SHARED_PREFIX: usize = 255;

/// Encodes file-list entries for protocol 30 and newer, following
/// `send_file_entry()` in upstream `flist.c`.
///
/// The writer remembers the previous entry so repeated fields can be elided.
/// It covers regular files only: no devices, symlinks or hard-link data.
#[derive(Debug, Default)]
pub struct FileListWriter {
    preserve_uid: bool,
    preserve_gid: bool,
    prev_name: Vec<u8>,
    prev_mode: u32,
    prev_mtime: i64,
    prev_uid: u32,
    prev_gid: u32,
    written: usize,
}

impl FileListWriter {
    /// Creates a writer. Ownership fields are only sent when the matching
    /// `preserve_*` switch is on (`-o` / `-g`).
    #[must_use]
    pub fn new(preserve_uid: bool, preserve_gid: bool) -> Self {
        Self {
            preserve_uid,
            preserve_gid,
            ..Self::default()
        }
    }

    /// Number of entries written so far.
    #[must_use]
    pub const fn written(&self) -> usize {
        self.written
    }

    /// Writes one entry.
    pub fn write_entry<W: Write + ?Sized>(
        &mut self,
        writer: &mut W,
        entry: &FileEntry,
    ) -> io::Result<()> {
        let first = self.prev_name.is_empty();
        let mut xflags = 0u16;

        if entry.mode == self.prev_mode {
            xflags |= XMIT_SAME_MODE;
        }
        if !self.preserve_uid || (!first && entry.uid == self.prev_uid) {
            xflags |= XMIT_SAME_UID;
        }
        if !self.preserve_gid || (!first && entry.gid == self.prev_gid) {
            xflags |= XMIT_SAME_GID;
        }
        if entry.mtime == self.prev_mtime {
            xflags |= XMIT_SAME_TIME;
        }

        let shared = self
            .prev_name
            .iter()
            .zip(&entry.name)
            .take(MAX_SHARED_PREFIX)
            .take_while(|(a, b)| a == b)
            .count();
        let suffix = &entry.name[shared..];
        if shared > 0 {
            xflags |= XMIT_SAME_NAME;
        }
        if suffix.len() > 255 {
            xflags |= XMIT_LONG_NAME;
        }

        if xflags == 0 && !entry.is_dir() {
            xflags |= XMIT_TOP_DIR;
        }
        if xflags & 0xFF00 != 0 || xflags == 0 {
            xflags |= XMIT_EXTENDED_FLAGS;
            write_shortint(writer, xflags)?;
        } else {
            write_byte(writer, xflags as u8)?;
        }

        if xflags & XMIT_SAME_NAME != 0 {
            write_byte(writer, shared as u8)?;
        }
        if xflags & XMIT_LONG_NAME != 0 {
            let len = i32::try_from(suffix.len())
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "file name too long"))?;
            write_varint(writer, len)?;
        } else {
            write_byte(writer, suffix.len() as u8)?;
        }
        writer.write_all(suffix)?;

        write_varlong(writer, entry.size, 3)?;
        if xflags & XMIT_SAME_TIME == 0 {
            write_varlong(writer, entry.mtime, 4)?;
        }
        if xflags & XMIT_SAME_MODE == 0 {
            write_int(writer, entry.mode as i32)?;
        }
        if xflags & XMIT_SAME_UID == 0 {
            write_varint(writer, entry.uid as i32)?;
        }
        if xflags & XMIT_SAME_GID == 0 {
            write_varint(writer, entry.gid as i32)?;
        }
        if let Some(checksum) = &entry.checksum {
            writer.write_all(checksum)?;
        }

        self.prev_name.clone_from(&entry.name);
        self.prev_mode = entry.mode;
        self.prev_mtime = entry.mtime;
        self.prev_uid = entry.uid;
        self.prev_gid = entry.gid;
        self.written += 1;
        Ok(())
    }

    /// Writes the end-of-list marker.
    pub fn write_end<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        write_byte(writer, 0)
    }
}
