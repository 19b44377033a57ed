use std::io::{self, Read, Write};

use crate::varint::{read_int, write_int};

/// Largest block length accepted from a protocol 30+ receiver (`MAX_BLOCK_SIZE`).
pub const MAX_BLOCK_SIZE: i32 = 1 << 17;

/// Longest strong checksum a receiver may request per block.
pub const MAX_DIGEST_LEN: i32 = 16;

/// Header of the block checksums a receiver sends for its basis file.
///
/// Mirrors upstream `struct sum_struct` as exchanged by `read_sum_head()` and
/// `write_sum_head()`: four `int`s for the block count, block length, strong
/// checksum length and the size of the trailing short block.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SumHead {
    /// Number of checksum blocks that follow.
    pub count: i32,
    /// Block length in bytes.
    pub block_length: i32,
    /// Strong checksum bytes per block.
    pub checksum_length: i32,
    /// Size of the last, shorter block (0 when aligned).
    pub remainder: i32,
}

impl SumHead {
    /// Reads and validates a header.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        let head = Self {
            count: read_int(reader)?,
            block_length: read_int(reader)?,
            checksum_length: read_int(reader)?,
            remainder: read_int(reader)?,
        };
        head.validate()?;
        Ok(head)
    }

    /// Writes the header.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        write_int(writer, self.count)?;
        write_int(writer, self.block_length)?;
        write_int(writer, self.checksum_length)?;
        write_int(writer, self.remainder)
    }

    fn validate(&self) -> io::Result<()> {
        let problem = if self.count < 0 {
            Some("negative block count")
        } else if !(0..=MAX_BLOCK_SIZE).contains(&self.block_length) {
            Some("invalid block length")
        } else if !(0..=MAX_DIGEST_LEN).contains(&self.checksum_length) {
            Some("invalid checksum length")
        } else if self.remainder < 0 || self.remainder > self.block_length {
            Some("invalid remainder length")
        } else {
            None
        };
        match problem {
            Some(problem) => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{problem} in checksum header {self:?}"),
            )),
            None => Ok(()),
        }
    }
}
