//! Error types for the session layer.
//!
//! The validation core itself never fails: predicates, classification,
//! the boolean validator and the gate are total functions. These errors
//! only come out of the `Result`-returning helpers around the core
//! (configuration, issuance bounds, admission, owner tagging).

use tether_protocol::{PlayerAddress, SessionId};

/// Errors that can occur in the session layer.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The configuration's tunables contradict each other.
    #[error("invalid session config: {0}")]
    InvalidConfig(String),

    /// The requested session duration is outside the configured window.
    #[error("session duration {requested}s outside allowed range {min}s..={max}s")]
    DurationOutOfRange { requested: u64, min: u64, max: u64 },

    /// The requested quota is zero or above the per-session cap.
    #[error("transaction quota {requested} outside allowed range 1..={cap}")]
    QuotaOutOfRange { requested: u64, cap: u64 },

    /// Tried to issue a session with the `0` sentinel id.
    #[error("session id {0} is reserved")]
    InvalidSessionId(SessionId),

    /// A session in an owner-tagged set belongs to someone else.
    #[error("session {session_id} belongs to {actual}, not {owner}")]
    ForeignSession {
        session_id: SessionId,
        owner: PlayerAddress,
        actual: PlayerAddress,
    },

    /// The player already holds the maximum number of active sessions.
    #[error("player {owner} has {active} active sessions (limit {limit})")]
    TooManyActiveSessions {
        owner: PlayerAddress,
        active: usize,
        limit: usize,
    },
}
