//! Codec trait and implementations for serializing/deserializing records.
//!
//! Stores and execution pipelines ship [`SessionKey`](crate::SessionKey)
//! records around; they don't care HOW those records become bytes, only
//! that something implements [`Codec`]. [`JsonCodec`] is the default.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` so a single codec can be shared by a store that
/// is itself shared across async tasks.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use tether_protocol::{Codec, JsonCodec, PlayerAddress, SessionId, SessionKey};
///
/// let codec = JsonCodec;
///
/// let session = SessionKey {
///     session_id: SessionId(1),
///     player_address: PlayerAddress::new("0xabc"),
///     is_valid: true,
///     status: 0,
///     expires_at: 4_600,
///     last_used: 1_000,
///     max_transactions: 100,
///     used_transactions: 0,
/// };
///
/// let bytes = codec.encode(&session).unwrap();
/// let decoded: SessionKey = codec.decode(&bytes).unwrap();
/// assert_eq!(session, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
