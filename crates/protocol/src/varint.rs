//! Integer and string codecs used on the rsync wire.
//!
//! All multi-byte values are little-endian. Protocol 30 and newer use the
//! variable-length `varint`/`varlong` forms for most integers; the handshake,
//! the checksum header and literal tokens still use the fixed four-byte `int`.
//! The routines follow upstream `io.c` byte for byte.

use std::io::{self, Read, Write};

/// Number of extra bytes that follow a varint/varlong tag, indexed by
/// `tag / 4`. Mirrors `int_byte_extra` from upstream `io.c`.
const INT_BYTE_EXTRA: [u8; 64] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, //
    2, 2, 2, 2, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 5, 6, //
];

/// Longest string `write_vstring` can express.
const MAX_VSTRING_LEN: usize = 0x7FFF;

fn invalid_data(message: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

/// Writes a single byte.
pub fn write_byte<W: Write + ?Sized>(writer: &mut W, value: u8) -> io::Result<()> {
    writer.write_all(&[value])
}

/// Reads a single byte.
pub fn read_byte<R: Read + ?Sized>(reader: &mut R) -> io::Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Writes a two-byte little-endian value (`write_shortint`).
pub fn write_shortint<W: Write + ?Sized>(writer: &mut W, value: u16) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Reads a two-byte little-endian value (`read_shortint`).
pub fn read_shortint<R: Read + ?Sized>(reader: &mut R) -> io::Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

/// Writes a fixed four-byte little-endian integer (`write_int`).
pub fn write_int<W: Write + ?Sized>(writer: &mut W, value: i32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Reads a fixed four-byte little-endian integer (`read_int`).
pub fn read_int<R: Read + ?Sized>(reader: &mut R) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

/// Writes `value` with upstream's `write_varint` encoding.
///
/// The value is laid out little-endian behind a tag byte. Trailing zero bytes
/// are dropped; the number of leading one bits in the tag tells the reader
/// how many bytes follow, and the remaining tag bits carry the most
/// significant byte when it fits.
pub fn write_varint<W: Write + ?Sized>(writer: &mut W, value: i32) -> io::Result<()> {
    let mut bytes = [0u8; 5];
    bytes[1..].copy_from_slice(&value.to_le_bytes());

    let mut count = 4usize;
    while count > 1 && bytes[count] == 0 {
        count -= 1;
    }

    let bit = 1u8 << (8 - count);
    if bytes[count] >= bit {
        count += 1;
        bytes[0] = !(bit - 1);
    } else if count > 1 {
        bytes[0] = bytes[count] | !((bit << 1) - 1);
    } else {
        bytes[0] = bytes[count];
    }

    writer.write_all(&bytes[..count])
}

/// Reads a value written by [`write_varint`].
pub fn read_varint<R: Read + ?Sized>(reader: &mut R) -> io::Result<i32> {
    let tag = read_byte(reader)?;
    let extra = usize::from(INT_BYTE_EXTRA[usize::from(tag / 4)]);

    let mut bytes = [0u8; 5];
    if extra == 0 {
        bytes[0] = tag;
    } else {
        if extra >= bytes.len() {
            return Err(invalid_data("overflow in read_varint"));
        }
        reader.read_exact(&mut bytes[..extra])?;
        let bit = 1u8 << (8 - extra);
        bytes[extra] = tag & (bit - 1);
    }

    Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Writes a 64-bit value with upstream's `write_varlong` encoding.
///
/// At least `min_bytes` bytes are always emitted, which is why file sizes use
/// 3 and modification times use 4.
pub fn write_varlong<W: Write + ?Sized>(
    writer: &mut W,
    value: i64,
    min_bytes: u8,
) -> io::Result<()> {
    debug_assert!((1..=8).contains(&min_bytes));
    let min = usize::from(min_bytes);

    let mut bytes = [0u8; 9];
    bytes[1..].copy_from_slice(&value.to_le_bytes());

    let mut count = 8usize;
    while count > min && bytes[count] == 0 {
        count -= 1;
    }

    let bit = 1u8 << (7 + min - count);
    if bytes[count] >= bit {
        count += 1;
        bytes[0] = !(bit - 1);
    } else if count > min {
        bytes[0] = bytes[count] | !((bit << 1) - 1);
    } else {
        bytes[0] = bytes[count];
    }

    writer.write_all(&bytes[..count])
}

/// Reads a value written by [`write_varlong`] with the same `min_bytes`.
pub fn read_varlong<R: Read + ?Sized>(reader: &mut R, min_bytes: u8) -> io::Result<i64> {
    debug_assert!((1..=8).contains(&min_bytes));
    let min = usize::from(min_bytes);

    let mut head = [0u8; 8];
    reader.read_exact(&mut head[..min])?;

    let mut bytes = [0u8; 9];
    bytes[..min - 1].copy_from_slice(&head[1..min]);

    let tag = head[0];
    let extra = usize::from(INT_BYTE_EXTRA[usize::from(tag / 4)]);
    if extra == 0 {
        bytes[min - 1] = tag;
    } else {
        if min + extra > bytes.len() {
            return Err(invalid_data("overflow in read_varlong"));
        }
        reader.read_exact(&mut bytes[min - 1..min - 1 + extra])?;
        let bit = 1u8 << (8 - extra);
        bytes[min + extra - 1] = tag & (bit - 1);
    }

    let mut value = [0u8; 8];
    value.copy_from_slice(&bytes[..8]);
    Ok(i64::from_le_bytes(value))
}

/// Writes a length-prefixed string (`write_vstring`).
///
/// Lengths up to 127 take one byte; longer strings set the high bit of the
/// first byte and spill the low eight bits into a second one.
pub fn write_vstring<W: Write + ?Sized>(writer: &mut W, value: &[u8]) -> io::Result<()> {
    let len = value.len();
    if len > MAX_VSTRING_LEN {
        return Err(invalid_data("vstring longer than 32767 bytes"));
    }
    if len > 0x7F {
        writer.write_all(&[(len >> 8) as u8 | 0x80, len as u8])?;
    } else {
        write_byte(writer, len as u8)?;
    }
    writer.write_all(value)
}

/// Reads a string written by [`write_vstring`].
pub fn read_vstring<R: Read + ?Sized>(reader: &mut R) -> io::Result<Vec<u8>> {
    let first = read_byte(reader)?;
    let len = if first & 0x80 != 0 {
        usize::from(first & 0x7F) * 0x100 + usize::from(read_byte(reader)?)
    } else {
        usize::from(first)
    };
    let mut value = vec![0u8; len];
    reader.read_exact(&mut value)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn varint_bytes(value: i32) -> Vec<u8> {
        let mut out = Vec::new();
        write_varint(&mut out, value).unwrap();
        out
    }

    fn varlong_bytes(value: i64, min_bytes: u8) -> Vec<u8> {
        let mut out = Vec::new();
        write_varlong(&mut out, value, min_bytes).unwrap();
        out
    }

    #[test]
    fn varint_small_values_use_one_byte() {
        assert_eq!(varint_bytes(0), vec![0x00]);
        assert_eq!(varint_bytes(30), vec![0x1E]);
        assert_eq!(varint_bytes(127), vec![0x7F]);
    }

    #[test]
    fn varint_known_encodings() {
        assert_eq!(varint_bytes(128), vec![0x80, 0x80]);
        assert_eq!(varint_bytes(0x3FFF), vec![0xBF, 0xFF]);
        assert_eq!(varint_bytes(0x4000), vec![0xC0, 0x00, 0x40]);
        assert_eq!(varint_bytes(-1), vec![0xF0, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn varlong_respects_minimum_width() {
        assert_eq!(varlong_bytes(0, 3), vec![0x00, 0x00, 0x00]);
        assert_eq!(varlong_bytes(5, 3), vec![0x00, 0x05, 0x00]);
        assert_eq!(varlong_bytes(0x0001_0000, 3), vec![0x01, 0x00, 0x00]);
        assert_eq!(varlong_bytes(0x0100_0000, 3), vec![0x81, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn varlong_mtime_width() {
        let encoded = varlong_bytes(1_700_000_000, 4);
        assert_eq!(encoded.len(), 4);
        let decoded = read_varlong(&mut Cursor::new(encoded), 4).unwrap();
        assert_eq!(decoded, 1_700_000_000);
    }

    #[test]
    fn varint_rejects_overflowing_tag() {
        let err = read_varint(&mut Cursor::new(vec![0xFC, 0, 0, 0, 0, 0])).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn truncated_input_reports_eof() {
        let err = read_varint(&mut Cursor::new(vec![0xC0, 0x00])).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        let err = read_int(&mut Cursor::new(vec![1, 2])).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn fixed_width_integers_are_little_endian() {
        let mut out = Vec::new();
        write_int(&mut out, 31).unwrap();
        write_shortint(&mut out, 0x8000).unwrap();
        assert_eq!(out, vec![31, 0, 0, 0, 0x00, 0x80]);

        let mut cursor = Cursor::new(out);
        assert_eq!(read_int(&mut cursor).unwrap(), 31);
        assert_eq!(read_shortint(&mut cursor).unwrap(), 0x8000);
    }

    #[test]
    fn vstring_switches_to_two_byte_length() {
        let mut out = Vec::new();
        write_vstring(&mut out, b"abc").unwrap();
        assert_eq!(out, b"\x03abc");

        let long = vec![b'x'; 300];
        let mut out = Vec::new();
        write_vstring(&mut out, &long).unwrap();
        assert_eq!(&out[..2], &[0x81, 0x2C]);
        assert_eq!(read_vstring(&mut Cursor::new(out)).unwrap(), long);
    }

    #[test]
    fn vstring_rejects_oversized_input() {
        let huge = vec![0u8; MAX_VSTRING_LEN + 1];
        assert!(write_vstring(&mut Vec::new(), &huge).is_err());
    }

    proptest! {
        #[test]
        fn varint_decodes_what_it_encodes(value in any::<i32>()) {
            let encoded = varint_bytes(value);
            prop_assert!(encoded.len() <= 5);
            prop_assert_eq!(read_varint(&mut Cursor::new(encoded)).unwrap(), value);
        }

        #[test]
        fn varlong_decodes_what_it_encodes(value in 0i64..=i64::MAX, min_bytes in 3u8..=4) {
            let encoded = varlong_bytes(value, min_bytes);
            prop_assert!(encoded.len() >= usize::from(min_bytes));
            prop_assert_eq!(read_varlong(&mut Cursor::new(encoded), min_bytes).unwrap(), value);
        }
    }
}
