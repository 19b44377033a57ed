use std::io::{self, Write};

use super::send_msg;
use crate::envelope::{MAX_PAYLOAD_LENGTH, MessageCode};

/// Buffer size used by [`MultiplexWriter::new`], matching upstream's
/// `IO_BUFFER_SIZE`.
const DEFAULT_CAPACITY: usize = 32 * 1024;

/// Buffers protocol output and emits it as `MSG_DATA` frames.
///
/// Data is framed when the buffer fills up or when [`Write::flush`] is
/// called, so callers decide where batch boundaries fall. Out-of-band
/// messages sent with [`MultiplexWriter::send_message`] first drain the
/// buffer, keeping the stream order identical to the call order.
pub struct MultiplexWriter<W: Write> {
    inner: W,
    buffer: Vec<u8>,
    capacity: usize,
}

impl<W: Write> MultiplexWriter<W> {
    /// Wraps `inner` with the default 32 KiB frame buffer.
    pub fn new(inner: W) -> Self {
        Self::with_capacity(inner, DEFAULT_CAPACITY)
    }

    /// Wraps `inner`, framing at most `capacity` bytes per `MSG_DATA` frame.
    pub fn with_capacity(inner: W, capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_PAYLOAD_LENGTH as usize);
        Self {
            inner,
            buffer: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Sends a non-data message after draining buffered data.
    pub fn send_message(&mut self, code: MessageCode, payload: &[u8]) -> io::Result<()> {
        self.drain()?;
        send_msg(&mut self.inner, code, payload)
    }

    /// Returns the wrapped writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Frames any buffered data and returns the wrapped writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.drain()?;
        Ok(self.inner)
    }

    fn drain(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        send_msg(&mut self.inner, MessageCode::Data, &self.buffer)?;
        self.buffer.clear();
        Ok(())
    }
}

impl<W: Write> Write for MultiplexWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut remaining = buf;
        while !remaining.is_empty() {
            let take = (self.capacity - self.buffer.len()).min(remaining.len());
            self.buffer.extend_from_slice(&remaining[..take]);
            remaining = &remaining[take..];
            if self.buffer.len() == self.capacity {
                self.drain()?;
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.drain()?;
        self.inner.flush()
    }
}
