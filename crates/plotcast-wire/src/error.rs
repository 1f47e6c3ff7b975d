/// Errors that can occur while parsing wire input.
///
/// Encoding never fails; every variant here comes from decoding a packet
/// or parsing a control message.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The packet is shorter than the minimum decodable layout.
    #[error("packet too short ({len} bytes)")]
    Truncated { len: usize },

    /// The ASCII header is missing a field or contains a non-numeric value.
    #[error("invalid packet header: {0}")]
    InvalidHeader(String),

    /// The packet does not end with the `|g\r\n` terminator.
    #[error("missing packet terminator")]
    MissingTerminator,

    /// The sample payload has an odd byte count and cannot hold whole
    /// 16-bit values.
    #[error("odd sample payload length ({0} bytes)")]
    OddPayload(usize),

    /// A control message that is neither a well-formed CONNECT nor a
    /// DISCONNECT.
    #[error("malformed control message: {0:?}")]
    MalformedControl(String),

    /// CONNECT carried an address token that does not parse as an IP.
    #[error("invalid address in control message: {0:?}")]
    InvalidAddress(String),

    /// CONNECT carried a port token that does not parse as a u16.
    #[error("invalid port in control message: {0:?}")]
    InvalidPort(String),
}

pub type Result<T> = std::result::Result<T, WireError>;
