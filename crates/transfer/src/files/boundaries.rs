use std::fmt;

/// Byte range of a tracked file that is served to a client.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FileBoundaries {
    offset: u64,
    length: u64,
}

impl FileBoundaries {
    /// A fixed range starting at `offset`.
    #[must_use]
    pub const fn new(offset: u64, length: u64) -> Self {
        Self { offset, length }
    }

    /// Everything the file holds at request time.
    #[must_use]
    pub const fn whole_file() -> Self {
        Self::new(0, u64::MAX)
    }

    /// First byte served.
    #[must_use]
    pub const fn offset(self) -> u64 {
        self.offset
    }

    /// Number of bytes requested, before clamping.
    #[must_use]
    pub const fn length(self) -> u64 {
        self.length
    }

    /// Restricts the range to a file of `file_len` bytes.
    #[must_use]
    pub fn clamp_to(self, file_len: u64) -> Self {
        let offset = self.offset.min(file_len);
        Self::new(offset, self.length.min(file_len - offset))
    }
}

impl Default for FileBoundaries {
    fn default() -> Self {
        Self::whole_file()
    }
}

impl fmt::Display for FileBoundaries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.offset, self.length)
    }
}

/// Computes the range to serve each time a client asks for a file.
///
/// Providers are consulted once per request, so they may follow a file that
/// is still being appended to.
pub trait FileBoundariesProvider: Send + Sync {
    /// Range to serve for the current request.
    fn boundaries(&self) -> FileBoundaries;
}

impl FileBoundariesProvider for FileBoundaries {
    fn boundaries(&self) -> FileBoundaries {
        *self
    }
}

impl<F> FileBoundariesProvider for F
where
    F: Fn() -> FileBoundaries + Send + Sync,
{
    fn boundaries(&self) -> FileBoundaries {
        self()
    }
}
