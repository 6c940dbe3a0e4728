//! Data model for Tether.
//!
//! This crate defines the records that every other layer passes around:
//!
//! - **Types** ([`SessionKey`], [`StatusCode`], [`PlayerAddress`], etc.) —
//!   the session record and the vocabulary used to classify it.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those records are
//!   converted to/from bytes when a store or pipeline ships them around.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about time, configuration, or policy.
//! It only describes what a session key looks like.
//!
//! ```text
//! Protocol (SessionKey) → Session (validation, renewal) → Service (store)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{PlayerAddress, SessionId, SessionKey, StatusCode, Timestamp};
