//! Validator configuration.

use serde::{Deserialize, Serialize};

use crate::SessionError;

/// The stock tunables, in seconds or counts.
///
/// These are the values [`SessionConfig::default()`] uses. They are kept
/// as named constants so other systems (the issuer, a cleanup job) can
/// refer to the same numbers.
pub mod defaults {
    /// Shortest session an issuer may grant.
    pub const MIN_SESSION_DURATION: u64 = 3_600;
    /// Longest session an issuer may grant.
    pub const MAX_SESSION_DURATION: u64 = 86_400;
    /// Upper bound on a session's transaction quota.
    pub const MAX_TRANSACTIONS_PER_SESSION: u64 = 1_000;
    /// Sessions with less time than this left are renewed by the gate.
    pub const AUTO_RENEWAL_THRESHOLD: u64 = 300;
    /// How far past the renewal instant a renewed session lasts.
    pub const DEFAULT_RENEWAL_DURATION: u64 = 3_600;
    /// Quota granted to a renewed session.
    pub const DEFAULT_QUOTA: u64 = MAX_TRANSACTIONS_PER_SESSION;
    /// Active sessions one player may hold at once.
    pub const MAX_ACTIVE_SESSIONS_PER_PLAYER: usize = 5;
    /// Age after which an external collector may archive a dead session.
    pub const SESSION_CLEANUP_THRESHOLD: u64 = 86_400;
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session validation and renewal.
///
/// Passed to [`SessionValidator`](crate::SessionValidator) at construction
/// and never changed afterwards. Start from `SessionConfig::default()` and
/// override the fields you care about:
///
/// ```rust
/// use tether_session::SessionConfig;
///
/// let config = SessionConfig {
///     auto_renewal_threshold_secs: 60,
///     ..SessionConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
///
/// `#[serde(default)]` means a JSON document only needs to name the
/// fields it overrides; everything else falls back to [`defaults`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Shortest duration an issued session may have.
    pub min_session_duration_secs: u64,

    /// Longest duration an issued session may have.
    pub max_session_duration_secs: u64,

    /// Cap on the quota requested at issuance.
    pub max_transactions_per_session: u64,

    /// A session with less than this much time left (but not yet expired)
    /// is renewed by the gate.
    pub auto_renewal_threshold_secs: u64,

    /// A renewed session expires this long after the renewal instant.
    pub renewal_duration_secs: u64,

    /// Quota a renewed session gets, regardless of how much it had used.
    pub default_quota: u64,

    /// How many active sessions one player may hold.
    pub max_active_sessions_per_player: usize,

    /// Reserved for an external garbage collector. Nothing in this crate
    /// reads it.
    pub cleanup_threshold_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_session_duration_secs: defaults::MIN_SESSION_DURATION,
            max_session_duration_secs: defaults::MAX_SESSION_DURATION,
            max_transactions_per_session: defaults::MAX_TRANSACTIONS_PER_SESSION,
            auto_renewal_threshold_secs: defaults::AUTO_RENEWAL_THRESHOLD,
            renewal_duration_secs: defaults::DEFAULT_RENEWAL_DURATION,
            default_quota: defaults::DEFAULT_QUOTA,
            max_active_sessions_per_player: defaults::MAX_ACTIVE_SESSIONS_PER_PLAYER,
            cleanup_threshold_secs: defaults::SESSION_CLEANUP_THRESHOLD,
        }
    }
}

impl SessionConfig {
    /// Checks that the tunables are consistent with each other.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidConfig`] naming the first problem.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.min_session_duration_secs > self.max_session_duration_secs {
            return Err(SessionError::InvalidConfig(format!(
                "min session duration {}s exceeds max {}s",
                self.min_session_duration_secs, self.max_session_duration_secs
            )));
        }
        // A zero renewal would "renew" a session straight into expiry.
        if self.renewal_duration_secs == 0 {
            return Err(SessionError::InvalidConfig(
                "renewal duration must be non-zero".into(),
            ));
        }
        // Zero would refuse every issue, including a player's first.
        if self.max_active_sessions_per_player == 0 {
            return Err(SessionError::InvalidConfig(
                "max active sessions per player must be non-zero".into(),
            ));
        }
        if self.default_quota > self.max_transactions_per_session {
            return Err(SessionError::InvalidConfig(format!(
                "default quota {} exceeds per-session cap {}",
                self.default_quota, self.max_transactions_per_session
            )));
        }
        Ok(())
    }
}
