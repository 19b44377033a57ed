use std::io::{self, Read, Write};

use crate::varint::{read_shortint, write_shortint};

/// Item flags (`iflags`) that accompany every file index after protocol 29.
///
/// Only the bits the sender acts on get named constants; the rest are echoed
/// back untouched.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ItemFlags(u16);

impl ItemFlags {
    /// A basis-file type byte follows the flags (`ITEM_BASIS_TYPE_FOLLOWS`).
    pub const BASIS_TYPE_FOLLOWS: u16 = 1 << 11;
    /// An alternate name follows as a vstring (`ITEM_XNAME_FOLLOWS`).
    pub const XNAME_FOLLOWS: u16 = 1 << 12;
    /// The receiver has no copy of the file yet (`ITEM_IS_NEW`).
    pub const IS_NEW: u16 = 1 << 13;
    /// The file content must be transferred (`ITEM_TRANSFER`).
    pub const TRANSFER: u16 = 1 << 15;

    /// Wraps raw flag bits.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw flag bits.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Returns `true` when every bit of `mask` is set.
    #[must_use]
    pub const fn contains(self, mask: u16) -> bool {
        self.0 & mask == mask
    }

    /// Whether the receiver asked for file content.
    #[must_use]
    pub const fn wants_transfer(self) -> bool {
        self.contains(Self::TRANSFER)
    }

    /// Reads the flags as a shortint.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        read_shortint(reader).map(Self)
    }

    /// Writes the flags as a shortint.
    pub fn write_to<W: Write + ?Sized>(self, writer: &mut W) -> io::Result<()> {
        write_shortint(writer, self.0)
    }
}
