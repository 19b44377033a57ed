//! Framing of the session streams once multiplexing has started.
//!
//! After the compatibility exchange the server wraps its output in
//! `MSG_DATA` frames ([`MultiplexWriter`]) and, for protocol 30 and newer,
//! unwraps the client's input the same way ([`MultiplexReader`]).

use std::io::{self, Write};

use crate::envelope::{MessageCode, MessageHeader};

mod reader;
mod writer;


pub use reader::MultiplexReader;
pub use writer::MultiplexWriter;

/// Writes a single frame carrying `payload` under `code`.
pub fn send_msg<W: Write + ?Sized>(
    writer: &mut W,
    code: MessageCode,
    payload: &[u8],
) -> io::Result<()> {
    let header = MessageHeader::new(code, payload.len())
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    writer.write_all(&header.encode())?;
    writer.write_all(payload)
}
