use super::error::EnvelopeError;
use super::message_code::MessageCode;
use super::{HEADER_LEN, MAX_PAYLOAD_LENGTH, MPLEX_BASE};

/// A decoded multiplexed frame header.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MessageHeader {
    code: MessageCode,
    payload_len: u32,
}

impl MessageHeader {
    /// Creates a header, rejecting payloads longer than 24 bits.
    pub fn new(code: MessageCode, payload_len: usize) -> Result<Self, EnvelopeError> {
        match u32::try_from(payload_len) {
            Ok(len) if len <= MAX_PAYLOAD_LENGTH => Ok(Self {
                code,
                payload_len: len,
            }),
            _ => Err(EnvelopeError::OversizedPayload(payload_len)),
        }
    }

    /// Decodes the little-endian wire form.
    pub fn decode(bytes: [u8; HEADER_LEN]) -> Result<Self, EnvelopeError> {
        let raw = u32::from_le_bytes(bytes);
        let tag = (raw >> 24) as u8;
        if tag < MPLEX_BASE {
            return Err(EnvelopeError::InvalidTag(tag));
        }
        let code = tag - MPLEX_BASE;
        let code = MessageCode::from_u8(code).ok_or(EnvelopeError::UnknownMessageCode(code))?;
        Ok(Self {
            code,
            payload_len: raw & MAX_PAYLOAD_LENGTH,
        })
    }

    /// Encodes the header as `((MPLEX_BASE + code) << 24) | len`, little-endian.
    #[must_use]
    pub const fn encode(self) -> [u8; HEADER_LEN] {
        let tag = (MPLEX_BASE + self.code.as_u8()) as u32;
        ((tag << 24) | self.payload_len).to_le_bytes()
    }

    /// Message code carried by the frame.
    #[must_use]
    pub const fn code(self) -> MessageCode {
        self.code
    }

    /// Payload length in bytes.
    #[must_use]
    pub const fn payload_len(self) -> usize {
        self.payload_len as usize
    }
}
