//! Error types for the protocol layer.
//!
//! Each crate in Tether defines its own error enum. When you see a
//! `ProtocolError`, the problem is in how a record was represented
//! (bytes, status codes), not in whether a session is usable.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields,
    /// wrong data types, or truncated records.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A numeric status code outside the fixed `0..=5` range.
    #[error("unknown status code {0}")]
    UnknownStatus(u8),
}
