use std::io::{self, Read, Write};

/// Counts bytes read from the raw client stream for the stats block.
pub(crate) struct CountingReader<R> {
    inner: R,
    count: u64,
}

impl<R: Read> CountingReader<R> {
    pub(crate) const fn new(inner: R) -> Self {
        Self { inner, count: 0 }
    }

    pub(crate) const fn count(&self) -> u64 {
        self.count
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.count += read as u64;
        Ok(read)
    }
}

/// Counts bytes written to the raw client stream for the stats block.
pub(crate) struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W: Write> CountingWriter<W> {
    pub(crate) const fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }

    pub(crate) const fn count(&self) -> u64 {
        self.count
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.count += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_follow_traffic() {
        let mut reader = CountingReader::new(&b"abcdef"[..]);
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(reader.count(), 4);

        let mut writer = CountingWriter::new(Vec::new());
        writer.write_all(b"xyz").unwrap();
        writer.write_all(b"").unwrap();
        assert_eq!(writer.count(), 3);
    }
}
