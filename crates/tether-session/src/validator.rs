//! The session validator: boolean validation, admission, and the
//! centralized validate-and-maybe-renew gate.
//!
//! [`SessionValidator`] bundles an immutable [`SessionConfig`] with a
//! [`Clock`]. Every operation comes in two forms:
//!
//! - `*_at(.., now)` — the canonical, time-explicit implementation.
//! - the same name without `_at` — reads the clock and delegates. These are
//!   one-liners; none of them carries logic of its own.
//!
//! The one entry point privileged actions should call is
//! [`validate_and_maybe_renew_at`](SessionValidator::validate_and_maybe_renew_at).

use std::fmt;

use serde::{Deserialize, Serialize};
use tether_protocol::{PlayerAddress, SessionId, SessionKey, StatusCode, Timestamp};

use crate::predicates::{self, has_quota, is_expired, matches_owner};
use crate::{Clock, OwnedSessions, SessionConfig, SessionError, SystemClock, classify};

// ---------------------------------------------------------------------------
// Rejection
// ---------------------------------------------------------------------------

/// Why the boolean validator refused a session.
///
/// Variants are listed in the order the validator checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rejection {
    /// The `0` sentinel id (or no session at all).
    NoSession,
    /// The caller is not the player who authorized the session.
    NotOwner,
    Revoked,
    Inactive,
    Expired,
    Exhausted,
}

impl Rejection {
    /// The caller-independent status this rejection corresponds to.
    ///
    /// `NotOwner` has none: the session may be perfectly `Valid` for its
    /// real owner.
    pub fn status(self) -> Option<StatusCode> {
        match self {
            Self::NoSession => Some(StatusCode::Invalid),
            Self::NotOwner => None,
            Self::Revoked => Some(StatusCode::Revoked),
            Self::Inactive => Some(StatusCode::Inactive),
            Self::Expired => Some(StatusCode::Expired),
            Self::Exhausted => Some(StatusCode::Exhausted),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NoSession => "no session",
            Self::NotOwner => "caller does not own session",
            Self::Revoked => "session revoked",
            Self::Inactive => "session inactive",
            Self::Expired => "session expired",
            Self::Exhausted => "transaction quota exhausted",
        };
        f.write_str(reason)
    }
}

/// Runs the boolean validator's checks in order and returns the first one
/// that fails, or `None` if `caller` may act with `session` at `now`.
///
/// Order: sentinel id, ownership, revocation, administrative status,
/// expiry, quota.
pub fn rejection_reason(
    session: &SessionKey,
    caller: &PlayerAddress,
    now: Timestamp,
) -> Option<Rejection> {
    // Ownership is checked before any state, so a stranger always gets
    // `NotOwner` and learns nothing about whether the key is revoked,
    // expired or spent.
    if session.session_id.is_none() {
        Some(Rejection::NoSession)
    } else if !matches_owner(session, caller) {
        Some(Rejection::NotOwner)
    } else if !session.is_valid {
        Some(Rejection::Revoked)
    } else if session.status != 0 {
        Some(Rejection::Inactive)
    } else if is_expired(session, now) {
        Some(Rejection::Expired)
    } else if !has_quota(session) {
        Some(Rejection::Exhausted)
    } else {
        None
    }
}

/// Returns a renewed copy of `session`.
///
/// The new expiry counts from `now`, not from the old `expires_at`, and the
/// quota is reset to `config.default_quota` no matter how much was used.
pub fn renew(session: &SessionKey, now: Timestamp, config: &SessionConfig) -> SessionKey {
    SessionKey {
        expires_at: now.saturating_add(config.renewal_duration_secs),
        last_used: now,
        max_transactions: config.default_quota,
        used_transactions: 0,
        // Struct update syntax: id, owner, `is_valid` and `status` carry
        // over from the original.
        ..session.clone()
    }
}

// ---------------------------------------------------------------------------
// GateDecision
// ---------------------------------------------------------------------------

/// The outcome of the centralized gate.
///
/// `session` is always the record the caller should carry forward: the
/// original on rejection or plain acceptance, a renewed copy when
/// `renewed` is set. Persisting a renewed copy is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateDecision {
    pub accepted: bool,
    pub renewed: bool,
    /// The failed check when `accepted` is `false`.
    pub rejection: Option<Rejection>,
    pub session: SessionKey,
}

impl GateDecision {
    /// The `(accepted, session)` pair.
    pub fn into_parts(self) -> (bool, SessionKey) {
        (self.accepted, self.session)
    }
}

// ---------------------------------------------------------------------------
// SessionValidator
// ---------------------------------------------------------------------------

/// Validates, classifies, and renews session keys under one configuration.
///
/// Holds no mutable state: the same inputs always give the same answer.
///
/// # Example
///
/// ```rust
/// use tether_protocol::{PlayerAddress, SessionId, SessionKey};
/// use tether_session::{ManualClock, SessionConfig, SessionValidator};
///
/// let validator =
///     SessionValidator::with_clock(SessionConfig::default(), ManualClock::new(800))
///         .unwrap();
/// let owner = PlayerAddress::new("0xabc");
/// let session = SessionKey {
///     session_id: SessionId(1),
///     player_address: owner.clone(),
///     is_valid: true,
///     status: 0,
///     expires_at: 1_000,
///     last_used: 0,
///     max_transactions: 100,
///     used_transactions: 40,
/// };
///
/// // 200s left is inside the 300s renewal window.
/// let decision = validator.validate_and_maybe_renew(&session, &owner);
/// assert!(decision.accepted && decision.renewed);
/// assert_eq!(decision.session.expires_at, 800 + 3_600);
/// assert_eq!(decision.session.used_transactions, 0);
/// ```
#[derive(Debug, Clone)]
pub struct SessionValidator<C = SystemClock> {
    config: SessionConfig,
    clock: C,
}

impl SessionValidator<SystemClock> {
    /// Creates a validator that reads the system clock.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidConfig`] if `config` fails
    /// [`SessionConfig::validate`].
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> SessionValidator<C> {
    /// Creates a validator with an explicit time source.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidConfig`] if `config` fails
    /// [`SessionConfig::validate`].
    pub fn with_clock(config: SessionConfig, clock: C) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self { config, clock })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Current time according to this validator's clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    // =====================================================================
    // Predicates
    // =====================================================================

    pub fn time_remaining_at(&self, session: &SessionKey, now: Timestamp) -> u64 {
        predicates::time_remaining(session, now)
    }

    pub fn time_remaining(&self, session: &SessionKey) -> u64 {
        self.time_remaining_at(session, self.now())
    }

    pub fn is_expired_at(&self, session: &SessionKey, now: Timestamp) -> bool {
        predicates::is_expired(session, now)
    }

    pub fn is_expired(&self, session: &SessionKey) -> bool {
        self.is_expired_at(session, self.now())
    }

    /// `true` if the session is alive but inside the configured renewal
    /// window.
    pub fn needs_auto_renewal_at(&self, session: &SessionKey, now: Timestamp) -> bool {
        predicates::needs_auto_renewal(session, now, self.config.auto_renewal_threshold_secs)
    }

    pub fn needs_auto_renewal(&self, session: &SessionKey) -> bool {
        self.needs_auto_renewal_at(session, self.now())
    }

    // =====================================================================
    // Classification and validation
    // =====================================================================

    /// Classifies `session` at `now`.
    ///
    /// `_caller` is accepted so every call site looks the same, but status
    /// codes are caller-independent and it is ignored. Use
    /// [`is_valid_for_action_at`](Self::is_valid_for_action_at) to ask
    /// about a specific caller.
    pub fn classify_at(
        &self,
        session: &SessionKey,
        _caller: &PlayerAddress,
        now: Timestamp,
    ) -> StatusCode {
        classify(session, now)
    }

    pub fn classify(&self, session: &SessionKey, caller: &PlayerAddress) -> StatusCode {
        self.classify_at(session, caller, self.now())
    }

    /// The must-pass check for every privileged action.
    ///
    /// `true` iff the session is real, owned by `caller`, not revoked,
    /// administratively active, unexpired, and has quota left.
    pub fn is_valid_for_action_at(
        &self,
        session: &SessionKey,
        caller: &PlayerAddress,
        now: Timestamp,
    ) -> bool {
        rejection_reason(session, caller, now).is_none()
    }

    pub fn is_valid_for_action(&self, session: &SessionKey, caller: &PlayerAddress) -> bool {
        self.is_valid_for_action_at(session, caller, self.now())
    }

    /// Like [`is_valid_for_action_at`](Self::is_valid_for_action_at), but
    /// says which check failed.
    pub fn rejection_reason_at(
        &self,
        session: &SessionKey,
        caller: &PlayerAddress,
        now: Timestamp,
    ) -> Option<Rejection> {
        rejection_reason(session, caller, now)
    }

    pub fn rejection_reason(
        &self,
        session: &SessionKey,
        caller: &PlayerAddress,
    ) -> Option<Rejection> {
        self.rejection_reason_at(session, caller, self.now())
    }

    // =====================================================================
    // Admission
    // =====================================================================

    /// `true` if the owner of `existing` may open another session at `now`.
    ///
    /// Linear in the size of the set.
    pub fn can_create_session_at(&self, existing: &OwnedSessions<'_>, now: Timestamp) -> bool {
        existing.active_count(now) < self.config.max_active_sessions_per_player
    }

    pub fn can_create_session(&self, existing: &OwnedSessions<'_>) -> bool {
        self.can_create_session_at(existing, self.now())
    }

    /// `Result` form of the admission check.
    ///
    /// # Errors
    /// Returns [`SessionError::TooManyActiveSessions`] when the owner is at
    /// the limit.
    pub fn check_admission_at(
        &self,
        existing: &OwnedSessions<'_>,
        now: Timestamp,
    ) -> Result<(), SessionError> {
        if self.can_create_session_at(existing, now) {
            return Ok(());
        }
        Err(SessionError::TooManyActiveSessions {
            owner: existing.owner().clone(),
            active: existing.active_count(now),
            limit: self.config.max_active_sessions_per_player,
        })
    }

    pub fn check_admission(&self, existing: &OwnedSessions<'_>) -> Result<(), SessionError> {
        self.check_admission_at(existing, self.now())
    }

    // =====================================================================
    // Centralized gate
    // =====================================================================

    /// Validates `session` for `caller` and renews it if it is about to
    /// expire.
    ///
    /// ```text
    /// is_valid_for_action? ──no──→ (false, session unchanged)
    ///        │ yes
    ///        ▼
    /// needs_auto_renewal? ──no──→ (true, session unchanged)
    ///        │ yes
    ///        ▼
    /// (true, renewed copy)
    /// ```
    ///
    /// Never mutates its input and never touches storage, so two calls at
    /// the same instant with the same session give identical results.
    pub fn validate_and_maybe_renew_at(
        &self,
        session: &SessionKey,
        caller: &PlayerAddress,
        now: Timestamp,
    ) -> GateDecision {
        if let Some(reason) = rejection_reason(session, caller, now) {
            return GateDecision {
                accepted: false,
                renewed: false,
                rejection: Some(reason),
                session: session.clone(),
            };
        }

        if self.needs_auto_renewal_at(session, now) {
            return GateDecision {
                accepted: true,
                renewed: true,
                rejection: None,
                session: self.renew_at(session, now),
            };
        }

        GateDecision {
            accepted: true,
            renewed: false,
            rejection: None,
            session: session.clone(),
        }
    }

    pub fn validate_and_maybe_renew(
        &self,
        session: &SessionKey,
        caller: &PlayerAddress,
    ) -> GateDecision {
        self.validate_and_maybe_renew_at(session, caller, self.now())
    }

    /// Renewed copy of `session` under this validator's config.
    pub fn renew_at(&self, session: &SessionKey, now: Timestamp) -> SessionKey {
        renew(session, now, &self.config)
    }

    // =====================================================================
    // Issuance bounds
    // =====================================================================

    /// Checks requested issuance parameters against the configured window
    /// and cap.
    ///
    /// # Errors
    /// - [`SessionError::DurationOutOfRange`] — duration outside
    ///   `min..=max`
    /// - [`SessionError::QuotaOutOfRange`] — quota zero or above the cap
    pub fn check_issue(&self, duration_secs: u64, max_transactions: u64) -> Result<(), SessionError> {
        let min = self.config.min_session_duration_secs;
        let max = self.config.max_session_duration_secs;
        if !(min..=max).contains(&duration_secs) {
            return Err(SessionError::DurationOutOfRange {
                requested: duration_secs,
                min,
                max,
            });
        }

        let cap = self.config.max_transactions_per_session;
        if max_transactions == 0 || max_transactions > cap {
            return Err(SessionError::QuotaOutOfRange {
                requested: max_transactions,
                cap,
            });
        }
        Ok(())
    }

    /// Mints a fresh, active session record.
    ///
    /// This does not run the admission check; callers that need it should
    /// call [`check_admission_at`](Self::check_admission_at) first.
    ///
    /// # Errors
    /// - [`SessionError::InvalidSessionId`] — `session_id` is the sentinel
    /// - anything [`check_issue`](Self::check_issue) returns
    pub fn issue_at(
        &self,
        session_id: SessionId,
        owner: PlayerAddress,
        duration_secs: u64,
        max_transactions: u64,
        now: Timestamp,
    ) -> Result<SessionKey, SessionError> {
        if session_id.is_none() {
            return Err(SessionError::InvalidSessionId(session_id));
        }
        self.check_issue(duration_secs, max_transactions)?;

        Ok(SessionKey {
            session_id,
            player_address: owner,
            is_valid: true,
            status: 0,
            expires_at: now.saturating_add(duration_secs),
            last_used: now,
            max_transactions,
            used_transactions: 0,
        })
    }

    pub fn issue(
        &self,
        session_id: SessionId,
        owner: PlayerAddress,
        duration_secs: u64,
        max_transactions: u64,
    ) -> Result<SessionKey, SessionError> {
        self.issue_at(session_id, owner, duration_secs, max_transactions, self.now())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionValidator`.
    //!
    //! Naming: `test_{function}_{scenario}_{expected}`. Everything runs
    //! against explicit timestamps or a `ManualClock`, so no test depends
    //! on wall-clock time.

    use super::*;
    use crate::ManualClock;

    // -- Helpers ----------------------------------------------------------

    fn validator() -> SessionValidator<ManualClock> {
        SessionValidator::with_clock(SessionConfig::default(), ManualClock::new(0)).unwrap()
    }

    fn player(addr: &str) -> PlayerAddress {
        PlayerAddress::new(addr)
    }

    /// Session 1 for P, expires at 1000, 0/100 used.
    fn session() -> SessionKey {
        SessionKey {
            session_id: SessionId(1),
            player_address: player("P"),
            is_valid: true,
            status: 0,
            expires_at: 1_000,
            last_used: 0,
            max_transactions: 100,
            used_transactions: 0,
        }
    }

    // =====================================================================
    // construction
    // =====================================================================

    #[test]
    fn test_new_rejects_inconsistent_config() {
        let config = SessionConfig {
            renewal_duration_secs: 0,
            ..SessionConfig::default()
        };
        assert!(matches!(
            SessionValidator::new(config),
            Err(SessionError::InvalidConfig(_))
        ));
    }

    // =====================================================================
    // is_valid_for_action() / rejection_reason()
    // =====================================================================

    #[test]
    fn test_is_valid_for_action_healthy_owner_returns_true() {
        let v = validator();
        assert!(v.is_valid_for_action_at(&session(), &player("P"), 500));
    }

    #[test]
    fn test_rejection_reason_reports_each_failure() {
        let v = validator();
        let p = player("P");

        let sentinel = SessionKey {
            session_id: SessionId::NONE,
            ..session()
        };
        assert_eq!(v.rejection_reason_at(&sentinel, &p, 500), Some(Rejection::NoSession));

        assert_eq!(
            v.rejection_reason_at(&session(), &player("Q"), 500),
            Some(Rejection::NotOwner)
        );

        let mut revoked = session();
        revoked.revoke();
        assert_eq!(v.rejection_reason_at(&revoked, &p, 500), Some(Rejection::Revoked));

        let inactive = SessionKey { status: 1, ..session() };
        assert_eq!(v.rejection_reason_at(&inactive, &p, 500), Some(Rejection::Inactive));

        assert_eq!(v.rejection_reason_at(&session(), &p, 1_000), Some(Rejection::Expired));

        let exhausted = SessionKey {
            used_transactions: 100,
            ..session()
        };
        assert_eq!(v.rejection_reason_at(&exhausted, &p, 500), Some(Rejection::Exhausted));
    }

    #[test]
    fn test_rejection_reason_ownership_checked_before_revocation() {
        // A stranger learns nothing about the session's state.
        let mut revoked = session();
        revoked.revoke();
        assert_eq!(
            rejection_reason(&revoked, &player("Q"), 500),
            Some(Rejection::NotOwner)
        );
    }

    #[test]
    fn test_rejection_status_mapping() {
        assert_eq!(Rejection::NoSession.status(), Some(StatusCode::Invalid));
        assert_eq!(Rejection::NotOwner.status(), None);
        assert_eq!(Rejection::Expired.status(), Some(StatusCode::Expired));
    }

    // =====================================================================
    // classify()
    // =====================================================================

    #[test]
    fn test_classify_ignores_caller() {
        let v = validator();
        assert_eq!(v.classify_at(&session(), &player("P"), 500), StatusCode::Valid);
        assert_eq!(v.classify_at(&session(), &player("Q"), 500), StatusCode::Valid);
    }

    #[test]
    fn test_ambient_forms_read_the_clock() {
        let v = validator();
        let p = player("P");

        v.clock().set(800);
        assert_eq!(v.time_remaining(&session()), 200);
        assert!(v.needs_auto_renewal(&session()));
        assert!(!v.is_expired(&session()));
        assert_eq!(v.classify(&session(), &p), StatusCode::Valid);

        v.clock().set(1_000);
        assert!(v.is_expired(&session()));
        assert!(!v.is_valid_for_action(&session(), &p));
        assert_eq!(v.rejection_reason(&session(), &p), Some(Rejection::Expired));
    }

    #[test]
    fn test_renew_takes_duration_and_quota_from_config() {
        let config = SessionConfig {
            renewal_duration_secs: 600,
            default_quota: 7,
            ..SessionConfig::default()
        };
        let spent = SessionKey {
            used_transactions: 60,
            ..session()
        };

        let renewed = renew(&spent, 900, &config);

        assert_eq!(renewed.expires_at, 1_500);
        assert_eq!(renewed.last_used, 900);
        assert_eq!(renewed.max_transactions, 7);
        assert_eq!(renewed.used_transactions, 0);
        assert_eq!(renewed.session_id, spent.session_id);

        let v = SessionValidator::with_clock(config, ManualClock::new(0)).unwrap();
        assert_eq!(v.renew_at(&spent, 900), renewed);
    }

    #[test]
    fn test_ambient_can_create_session_reads_the_clock() {
        let config = SessionConfig {
            max_active_sessions_per_player: 1,
            ..SessionConfig::default()
        };
        let v = SessionValidator::with_clock(config, ManualClock::new(800)).unwrap();
        let p = player("P");
        let sessions = [session()];
        let owned = OwnedSessions::new(&p, &sessions).unwrap();

        // The one session still holds the only slot.
        assert!(!v.can_create_session(&owned));

        // Once it expires, the slot frees up without touching the set.
        v.clock().set(1_000);
        assert!(v.can_create_session(&owned));
        assert!(v.check_admission(&owned).is_ok());
    }

    // =====================================================================
    // validate_and_maybe_renew()
    // =====================================================================

    #[test]
    fn test_gate_rejection_returns_session_unchanged() {
        let v = validator();
        let exhausted = SessionKey {
            used_transactions: 100,
            ..session()
        };

        let decision = v.validate_and_maybe_renew_at(&exhausted, &player("P"), 900);

        assert!(!decision.accepted);
        assert!(!decision.renewed);
        assert_eq!(decision.rejection, Some(Rejection::Exhausted));
        assert_eq!(decision.session, exhausted);
    }

    #[test]
    fn test_gate_outside_window_passes_through() {
        let v = validator();

        let decision = v.validate_and_maybe_renew_at(&session(), &player("P"), 100);

        assert!(decision.accepted);
        assert!(!decision.renewed);
        assert_eq!(decision.session, session());
    }

    #[test]
    fn test_gate_inside_window_renews_from_now() {
        let v = validator();
        let worn = SessionKey {
            used_transactions: 57,
            ..session()
        };

        let decision = v.validate_and_maybe_renew_at(&worn, &player("P"), 900);

        assert!(decision.accepted && decision.renewed);
        let renewed = decision.session;
        assert_eq!(renewed.expires_at, 900 + 3_600);
        assert_eq!(renewed.last_used, 900);
        assert_eq!(renewed.used_transactions, 0);
        assert_eq!(renewed.max_transactions, v.config().default_quota);
        // Identity fields survive renewal.
        assert_eq!(renewed.session_id, worn.session_id);
        assert_eq!(renewed.player_address, worn.player_address);
    }

    #[test]
    fn test_gate_expired_session_is_not_resurrected() {
        let v = validator();
        let decision = v.validate_and_maybe_renew_at(&session(), &player("P"), 1_000);
        assert!(!decision.accepted);
        assert!(!decision.renewed);
        assert_eq!(decision.session.expires_at, 1_000);
    }

    #[test]
    fn test_gate_into_parts_matches_fields() {
        let v = validator();
        let (accepted, result) = v
            .validate_and_maybe_renew_at(&session(), &player("P"), 100)
            .into_parts();
        assert!(accepted);
        assert_eq!(result, session());
    }

    // =====================================================================
    // check_issue() / issue()
    // =====================================================================

    #[test]
    fn test_check_issue_accepts_window_edges() {
        let v = validator();
        assert!(v.check_issue(3_600, 1).is_ok());
        assert!(v.check_issue(86_400, 1_000).is_ok());
    }

    #[test]
    fn test_check_issue_duration_out_of_range_returns_error() {
        let v = validator();
        assert!(matches!(
            v.check_issue(3_599, 10),
            Err(SessionError::DurationOutOfRange { requested: 3_599, min: 3_600, max: 86_400 })
        ));
        assert!(matches!(
            v.check_issue(86_401, 10),
            Err(SessionError::DurationOutOfRange { .. })
        ));
    }

    #[test]
    fn test_check_issue_quota_out_of_range_returns_error() {
        let v = validator();
        assert!(matches!(
            v.check_issue(3_600, 0),
            Err(SessionError::QuotaOutOfRange { requested: 0, cap: 1_000 })
        ));
        assert!(matches!(
            v.check_issue(3_600, 1_001),
            Err(SessionError::QuotaOutOfRange { requested: 1_001, .. })
        ));
    }

    #[test]
    fn test_issue_builds_active_session() {
        let v = validator();
        v.clock().set(10_000);

        let s = v.issue(SessionId(5), player("P"), 7_200, 50).unwrap();

        assert_eq!(s.session_id, SessionId(5));
        assert!(s.is_valid);
        assert_eq!(s.status, 0);
        assert_eq!(s.expires_at, 17_200);
        assert_eq!(s.last_used, 10_000);
        assert_eq!(s.max_transactions, 50);
        assert_eq!(s.used_transactions, 0);
        assert_eq!(v.classify(&s, &player("P")), StatusCode::Valid);
    }

    #[test]
    fn test_issue_sentinel_id_returns_error() {
        let v = validator();
        assert!(matches!(
            v.issue_at(SessionId::NONE, player("P"), 3_600, 10, 0),
            Err(SessionError::InvalidSessionId(_))
        ));
    }
}
