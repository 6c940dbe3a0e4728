//! Core record types for Tether.
//!
//! A session key is a derived credential a player authorizes so it can act
//! on their behalf for a bounded time and a bounded number of transactions.
//! This module defines the record itself plus the identifiers and status
//! vocabulary the validation layer uses to talk about it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Absolute time in whole seconds since the unix epoch.
///
/// Kept as a plain `u64` alias rather than `SystemTime` so that every
/// validation function can take time as an explicit, copyable argument.
pub type Timestamp = u64;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a session key.
///
/// `0` is reserved as the "no session" sentinel ([`SessionId::NONE`]).
/// A record carrying it is never a real session and always classifies as
/// [`StatusCode::Invalid`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl SessionId {
    /// The "no session" sentinel.
    pub const NONE: SessionId = SessionId(0);

    /// Returns `true` for the sentinel id.
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

/// The identity of the player who authorized a session.
///
/// This is whatever the identity source hands us (typically a wallet or
/// account address). Tether only ever compares addresses for equality; it
/// never parses them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerAddress(pub String);

impl PlayerAddress {
    /// Creates an address from anything string-like.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Returns the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerAddress {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

// ---------------------------------------------------------------------------
// SessionKey
// ---------------------------------------------------------------------------

/// A session key record.
///
/// Owned by exactly one player for its whole lifetime. The record is
/// mutated in only three places, all outside the validation core:
///
/// - the execution pipeline bumps `used_transactions` after each action,
/// - the gate hands back a renewed copy that the pipeline persists,
/// - a revocation clears `is_valid`.
///
/// Fields are public so stores and pipelines can build and persist records
/// directly; the validation layer only ever reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionKey {
    /// Unique id. `SessionId::NONE` means "no session".
    pub session_id: SessionId,

    /// The player who authorized this key. Immutable after creation.
    pub player_address: PlayerAddress,

    /// Revocation flag. Once cleared it is never set again.
    pub is_valid: bool,

    /// Administrative lifecycle code. `0` is active; any other value is
    /// inactive, with a meaning owned by the issuing system.
    pub status: u8,

    /// After this instant the session is time-expired.
    pub expires_at: Timestamp,

    /// When the session was last renewed (or issued).
    pub last_used: Timestamp,

    /// Transaction quota for the current window.
    pub max_transactions: u64,

    /// Transactions spent in the current window.
    pub used_transactions: u64,
}

impl SessionKey {
    /// Clears the revocation flag.
    ///
    /// This is a one-way transition: there is deliberately no method that
    /// sets `is_valid` back to `true`. Revoking twice is a no-op.
    pub fn revoke(&mut self) {
        self.is_valid = false;
    }

    /// Transactions left before the quota is exhausted.
    pub fn remaining_transactions(&self) -> u64 {
        self.max_transactions.saturating_sub(self.used_transactions)
    }
}

// ---------------------------------------------------------------------------
// StatusCode
// ---------------------------------------------------------------------------

/// The discrete classification of a session at a point in time.
///
/// The numeric values are part of the external contract and never change:
///
/// | code | variant |
/// |---|---|
/// | 0 | `Valid` |
/// | 1 | `Inactive` |
/// | 2 | `Revoked` |
/// | 3 | `Invalid` |
/// | 4 | `Expired` |
/// | 5 | `Exhausted` |
///
/// On the wire a status is its bare code (`4`, not `"Expired"`). serde goes
/// through `u8` in both directions, so decoding an unknown code fails with
/// [`ProtocolError::UnknownStatus`]. `Display` prints the name for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum StatusCode {
    /// Usable right now.
    Valid = 0,
    /// Administratively disabled (`status != 0`).
    Inactive = 1,
    /// Revocation flag cleared. Terminal.
    Revoked = 2,
    /// The `0` sentinel id. Not a real session.
    Invalid = 3,
    /// Past `expires_at`.
    Expired = 4,
    /// Transaction quota spent.
    Exhausted = 5,
}

impl StatusCode {
    /// Every status code, in numeric order.
    pub const ALL: [StatusCode; 6] = [
        Self::Valid,
        Self::Inactive,
        Self::Revoked,
        Self::Invalid,
        Self::Expired,
        Self::Exhausted,
    ];

    /// Returns the numeric wire value.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Returns `true` only for [`StatusCode::Valid`].
    pub fn is_usable(self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl TryFrom<u8> for StatusCode {
    type Error = ProtocolError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or(ProtocolError::UnknownStatus(code))
    }
}

impl From<StatusCode> for u8 {
    fn from(status: StatusCode) -> Self {
        status.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Valid => "Valid",
            Self::Inactive => "Inactive",
            Self::Revoked => "Revoked",
            Self::Invalid => "Invalid",
            Self::Expired => "Expired",
            Self::Exhausted => "Exhausted",
        };
        f.write_str(name)
    }
}
