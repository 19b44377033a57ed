//! File index (`ndx`) codec for protocol 30 and newer.
//!
//! Indices are sent as deltas from the previous index of the same sign, so
//! the common "next file" case costs one byte. `NDX_DONE` is the single byte
//! `0x00`; other negative values are prefixed with `0xFF`. A delta that does
//! not fit in one byte is escaped with `0xFE` followed by either a two-byte
//! big-endian delta or, with the high bit set, the full absolute value.
//!
//! Mirrors `write_ndx()`/`read_ndx()` from upstream `io.c`.

use std::io::{self, Read, Write};

use crate::varint::read_byte;

/// End of a phase, or of the whole request stream.
pub const NDX_DONE: i32 = -1;

/// End of the file lists (incremental recursion only).
pub const NDX_FLIST_EOF: i32 = -2;

/// Delta state for one direction of the stream.
///
/// Reading and writing keep independent states: use one `NdxState` for the
/// indices the client sends and another for those the server echoes.
#[derive(Clone, Debug)]
pub struct NdxState {
    prev_positive: i32,
    prev_negative: i32,
}

impl Default for NdxState {
    fn default() -> Self {
        Self::new()
    }
}

impl NdxState {
    /// Starts from upstream's initial values (`-1` and `1`).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            prev_positive: -1,
            prev_negative: 1,
        }
    }

    /// Encodes `ndx` relative to the previous index of the same sign.
    pub fn write_ndx<W: Write + ?Sized>(&mut self, writer: &mut W, ndx: i32) -> io::Result<()> {
        if ndx == NDX_DONE {
            return writer.write_all(&[0x00]);
        }

        let mut buf = [0u8; 6];
        let mut len = 0;
        let (value, diff) = if ndx >= 0 {
            let diff = ndx.wrapping_sub(self.prev_positive);
            self.prev_positive = ndx;
            (ndx, diff)
        } else {
            buf[len] = 0xFF;
            len += 1;
            let value = -ndx;
            let diff = value - self.prev_negative;
            self.prev_negative = value;
            (value, diff)
        };

        if diff > 0 && diff < 0xFE {
            buf[len] = diff as u8;
            len += 1;
        } else if (0..=0x7FFF).contains(&diff) {
            buf[len..len + 3].copy_from_slice(&[0xFE, (diff >> 8) as u8, diff as u8]);
            len += 3;
        } else {
            buf[len..len + 5].copy_from_slice(&[
                0xFE,
                (value >> 24) as u8 | 0x80,
                value as u8,
                (value >> 8) as u8,
                (value >> 16) as u8,
            ]);
            len += 5;
        }

        writer.write_all(&buf[..len])
    }

    /// Decodes the next index.
    pub fn read_ndx<R: Read + ?Sized>(&mut self, reader: &mut R) -> io::Result<i32> {
        let mut first = read_byte(reader)?;
        let negative = match first {
            0x00 => return Ok(NDX_DONE),
            0xFF => {
                first = read_byte(reader)?;
                true
            }
            _ => false,
        };
        let prev = if negative {
            self.prev_negative
        } else {
            self.prev_positive
        };

        let value = if first == 0xFE {
            let high = read_byte(reader)?;
            if high & 0x80 != 0 {
                let mut rest = [0u8; 3];
                reader.read_exact(&mut rest)?;
                i32::from(high & 0x7F) << 24
                    | i32::from(rest[0])
                    | i32::from(rest[1]) << 8
                    | i32::from(rest[2]) << 16
            } else {
                let low = read_byte(reader)?;
                prev.wrapping_add(i32::from(high) << 8 | i32::from(low))
            }
        } else {
            prev.wrapping_add(i32::from(first))
        };

        if negative {
            self.prev_negative = value;
            Ok(-value)
        } else {
            self.prev_positive = value;
            Ok(value)
        }
    }
}
