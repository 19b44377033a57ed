/// Errors raised while decoding a multiplexed frame header.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum EnvelopeError {
    /// The tag byte is below [`MPLEX_BASE`](super::MPLEX_BASE), which means
    /// the peer is not multiplexing.
    #[error("multiplexed header tag {0} is below the multiplex base")]
    InvalidTag(u8),
    /// The tag names a message code this server does not know.
    #[error("unknown multiplexed message code {0}")]
    UnknownMessageCode(u8),
    /// The payload does not fit in the 24-bit length field.
    #[error("multiplexed payload of {0} bytes exceeds the 24-bit limit")]
    OversizedPayload(usize),
}
