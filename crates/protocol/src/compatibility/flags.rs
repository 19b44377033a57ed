use std::fmt;
use std::io::{self, Read, Write};

use super::known::CompatFlag;

/// Immutable set of [`CompatFlag`] values backed by the wire byte.
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
pub struct CompatFlags {
    bits: u8,
}

impl CompatFlags {
    /// The empty set.
    pub const EMPTY: Self = Self { bits: 0 };

    /// Every flag this release defines.
    pub const ALL: Self = Self::from_flags(&CompatFlag::ALL);

    /// Builds a set from a slice of flags in a `const` context.
    #[must_use]
    pub const fn from_flags(flags: &[CompatFlag]) -> Self {
        let mut bits = 0u8;
        let mut index = 0;
        while index < flags.len() {
            bits |= flags[index].bit();
            index += 1;
        }
        Self { bits }
    }

    /// Returns a copy of the set with `flag` added.
    #[must_use]
    pub const fn with(self, flag: CompatFlag) -> Self {
        Self {
            bits: self.bits | flag.bit(),
        }
    }

    /// Returns `true` when `flag` is part of the set.
    #[must_use]
    pub const fn contains(self, flag: CompatFlag) -> bool {
        self.bits & flag.bit() != 0
    }

    /// Returns `true` when no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Number of flags in the set.
    #[must_use]
    pub const fn len(self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Encodes the set as the bitwise OR of every member's mask.
    #[must_use]
    pub const fn encode(self) -> u8 {
        self.bits
    }

    /// Decodes a wire byte. Bits without a defined flag are dropped.
    #[must_use]
    pub const fn decode(byte: u8) -> Self {
        Self {
            bits: byte & Self::ALL.bits,
        }
    }

    /// Collects the flags announced by the capability letters of an `-e`
    /// token, e.g. `LsfxC`. Letters without a matching flag are skipped.
    #[must_use]
    pub fn from_capability_letters(letters: &str) -> Self {
        letters
            .chars()
            .filter_map(CompatFlag::from_capability_letter)
            .collect()
    }

    /// Iterates over the members in ascending bit order.
    pub fn iter(self) -> impl Iterator<Item = CompatFlag> {
        CompatFlag::ALL
            .into_iter()
            .filter(move |flag| self.contains(*flag))
    }

    /// Writes the encoded byte to `writer`.
    pub fn write_to<W: Write + ?Sized>(self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&[self.encode()])
    }

    /// Reads one byte from `reader` and decodes it.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        let mut byte = [0u8; 1];
        reader.read_exact(&mut byte)?;
        Ok(Self::decode(byte[0]))
    }
}

impl FromIterator<CompatFlag> for CompatFlags {
    fn from_iter<I: IntoIterator<Item = CompatFlag>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl fmt::Debug for CompatFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for CompatFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        for (index, flag) in self.iter().enumerate() {
            if index > 0 {
                f.write_str("|")?;
            }
            f.write_str(flag.name())?;
        }
        Ok(())
    }
}
