//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding payloads.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed bytes, missing fields, or wrong
    /// types. A request failing here is reported to the sender as a
    /// malformed request before any state is looked up.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The payload parsed but violates a protocol rule.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
