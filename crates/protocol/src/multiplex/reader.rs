use std::io::{self, Read};

use tracing::{error, info, warn};

use crate::envelope::{HEADER_LEN, MessageCode, MessageHeader};

/// Extracts `MSG_DATA` payloads from a multiplexed input stream.
///
/// `MSG_NOOP` frames are skipped. Log-style frames (info, warnings, errors)
/// are forwarded to `tracing` and skipped. `MSG_ERROR_EXIT` means the client
/// is going away and surfaces as [`io::ErrorKind::ConnectionAborted`]; any
/// other code is unexpected for a server sender and is reported as
/// [`io::ErrorKind::InvalidData`].
pub struct MultiplexReader<R: Read> {
    inner: R,
    buffer: Vec<u8>,
    pos: usize,
}

impl<R: Read> MultiplexReader<R> {
    /// Wraps `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            pos: 0,
        }
    }

    /// Returns the wrapped reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Returns the wrapped reader, discarding any buffered payload.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn read_header(&mut self) -> io::Result<Option<MessageHeader>> {
        let mut bytes = [0u8; HEADER_LEN];
        let mut filled = 0;
        while filled < HEADER_LEN {
            match self.inner.read(&mut bytes[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "truncated multiplexed header",
                    ));
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
        MessageHeader::decode(bytes)
            .map(Some)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }

    /// Reads frames until a data payload is buffered. Returns `false` on a
    /// clean end of stream.
    fn fill(&mut self) -> io::Result<bool> {
        let Some(header) = self.read_header()? else {
            return Ok(false);
        };
        let mut payload = vec![0u8; header.payload_len()];
        self.inner.read_exact(&mut payload)?;

        match header.code() {
            MessageCode::Data => {
                self.buffer = payload;
                self.pos = 0;
            }
            MessageCode::NoOp => {}
            MessageCode::ErrorExit => {
                let code = payload
                    .get(..4)
                    .and_then(|bytes| bytes.try_into().ok())
                    .map_or(0, i32::from_le_bytes);
                return Err(io::Error::new(
                    io::ErrorKind::ConnectionAborted,
                    format!("client exited with code {code}"),
                ));
            }
            code if code.is_logging() => {
                let text = String::from_utf8_lossy(&payload);
                let text = text.trim_end();
                match code {
                    MessageCode::Info | MessageCode::Log | MessageCode::Client => {
                        info!(target: "rsynk::multiplex", code = %code, "client: {text}");
                    }
                    MessageCode::Warning => {
                        warn!(target: "rsynk::multiplex", code = %code, "client: {text}");
                    }
                    _ => error!(target: "rsynk::multiplex", code = %code, "client: {text}"),
                }
            }
            code => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("unexpected multiplexed message {code} from client"),
                ));
            }
        }
        Ok(true)
    }
}

impl<R: Read> Read for MultiplexReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        while self.pos == self.buffer.len() {
            if !self.fill()? {
                return Ok(0);
            }
        }
        let available = &self.buffer[self.pos..];
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }
}
