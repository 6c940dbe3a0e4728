//! The predicate layer: pure boolean checks over one session.
//!
//! Every function here takes time explicitly and touches nothing but its
//! arguments. [`SessionValidator`](crate::SessionValidator) wraps them with
//! the configured thresholds and an ambient clock; those wrappers delegate
//! here and never re-implement the logic.
//!
//! ```text
//!        issued              expires_at - threshold        expires_at
//!   ───────┼──────────────────────────┼───────────────────────┼──────────→ now
//!          │        usable            │  usable + renewable   │  expired
//! ```
//!
//! The renewal window ends strictly before `expires_at`: renewal smooths
//! over near-expiry, it never resurrects a session that has already died.

use tether_protocol::{PlayerAddress, SessionKey, Timestamp};

/// Seconds left before `session` expires, or `0` once it has.
pub fn time_remaining(session: &SessionKey, now: Timestamp) -> u64 {
    session.expires_at.saturating_sub(now)
}

/// `true` once `now` has reached `expires_at`.
pub fn is_expired(session: &SessionKey, now: Timestamp) -> bool {
    now >= session.expires_at
}

/// `true` while the session is alive but has less than `threshold_secs`
/// left.
///
/// Disjoint from [`is_expired`]: an expired session has no time remaining
/// and is never eligible.
pub fn needs_auto_renewal(session: &SessionKey, now: Timestamp, threshold_secs: u64) -> bool {
    // `remaining > 0` is what keeps the window disjoint from expiry.
    let remaining = time_remaining(session, now);
    remaining > 0 && remaining < threshold_secs
}

/// `true` while transactions remain in the quota.
///
/// Strict `<`: a session with `used == max` is exhausted.
pub fn has_quota(session: &SessionKey) -> bool {
    session.used_transactions < session.max_transactions
}

/// `true` if `identity` authorized this session.
pub fn matches_owner(session: &SessionKey, identity: &PlayerAddress) -> bool {
    session.player_address == *identity
}

/// `true` if the session counts against its owner's active-session limit.
///
/// This is the admission qualifier: not revoked, administratively active,
/// unexpired, and with quota left. The session id is not checked.
pub fn is_active(session: &SessionKey, now: Timestamp) -> bool {
    session.is_valid && session.status == 0 && !is_expired(session, now) && has_quota(session)
}
