//! `SessionService` builder and request flows.
//!
//! This is where the pure validator meets a store. Each flow is a short
//! read → decide → write sequence:
//!
//! ```text
//! issue()     : bounds → insert_admitted (admission runs inside the store)
//! authorize() : get → gate (maybe renew) → count the action → replace
//! revoke()    : get → clear is_valid → replace
//! status()    : get → classify
//! ```
//!
//! Writes go through [`SessionStore::replace`] with the version that was
//! read, so a lost race surfaces as [`StoreError::VersionConflict`] rather
//! than a double-counted or double-renewed session. The service never
//! retries a conflict; the caller decides whether to. The one retry it does
//! own is a fresh id after a random-id collision in `issue`.
//!
//! The validator underneath never logs. Everything worth a log line
//! (rejections, renewals, admission refusals) is logged here, where the
//! request context is known.

use rand::Rng;
use tether_protocol::{PlayerAddress, SessionId, SessionKey, StatusCode};
use tether_session::{
    Clock, OwnedSessions, Rejection, SessionConfig, SessionError, SessionValidator, SystemClock,
};

use crate::{SessionStore, StoreError, TetherError};

/// How many fresh ids `issue` tries before giving up on collisions.
const MAX_ID_ATTEMPTS: usize = 4;

/// Builder for configuring a [`SessionService`].
///
/// # Example
///
/// ```rust
/// use tether::prelude::*;
///
/// let service = SessionService::builder()
///     .config(SessionConfig {
///         auto_renewal_threshold_secs: 120,
///         ..SessionConfig::default()
///     })
///     .clock(ManualClock::new(0))
///     .build(MemorySessionStore::new())
///     .unwrap();
/// assert_eq!(service.validator().config().auto_renewal_threshold_secs, 120);
/// ```
pub struct SessionServiceBuilder<C = SystemClock> {
    config: SessionConfig,
    clock: C,
}

impl SessionServiceBuilder<SystemClock> {
    /// Creates a builder with default config and the system clock.
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
            clock: SystemClock,
        }
    }
}

impl Default for SessionServiceBuilder<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> SessionServiceBuilder<C> {
    /// Sets the validator configuration.
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Swaps the time source.
    pub fn clock<C2: Clock>(self, clock: C2) -> SessionServiceBuilder<C2> {
        SessionServiceBuilder {
            config: self.config,
            clock,
        }
    }

    /// Builds the service on top of `store`.
    ///
    /// # Errors
    /// Returns [`TetherError::Session`] if the configuration is invalid.
    pub fn build<S: SessionStore>(self, store: S) -> Result<SessionService<S, C>, TetherError> {
        let validator = SessionValidator::with_clock(self.config, self.clock)?;
        Ok(SessionService { store, validator })
    }
}

/// Issues, authorizes, and revokes session keys against a store.
pub struct SessionService<S: SessionStore, C: Clock = SystemClock> {
    store: S,
    validator: SessionValidator<C>,
}

impl SessionService<crate::MemorySessionStore> {
    /// Creates a new builder.
    pub fn builder() -> SessionServiceBuilder {
        SessionServiceBuilder::new()
    }
}

impl<S: SessionStore, C: Clock> SessionService<S, C> {
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn validator(&self) -> &SessionValidator<C> {
        &self.validator
    }

    /// Issues a new session key for `owner`.
    ///
    /// # Errors
    /// - [`SessionError::TooManyActiveSessions`](tether_session::SessionError::TooManyActiveSessions)
    ///   — the owner is at the active-session limit
    /// - [`SessionError::DurationOutOfRange`](tether_session::SessionError::DurationOutOfRange)
    ///   / [`QuotaOutOfRange`](tether_session::SessionError::QuotaOutOfRange)
    ///   — parameters outside the configured bounds
    /// - [`SessionError::ForeignSession`](tether_session::SessionError::ForeignSession)
    ///   — the store returned another player's session for this owner
    /// - [`StoreError::Duplicate`] — four freshly minted ids in a row were
    ///   already taken
    pub async fn issue(
        &self,
        owner: &PlayerAddress,
        duration_secs: u64,
        max_transactions: u64,
    ) -> Result<SessionKey, TetherError> {
        let now = self.validator.now();
        self.validator.check_issue(duration_secs, max_transactions)?;

        let mut attempts = 0;
        loop {
            attempts += 1;
            let session = self.validator.issue_at(
                generate_session_id(),
                owner.clone(),
                duration_secs,
                max_transactions,
                now,
            )?;

            // The admission check is handed to the store instead of being run
            // on a separate `list_for_owner` read. Otherwise two concurrent
            // issues could both see the owner under the limit.
            let admit = |existing: &[SessionKey]| -> Result<(), SessionError> {
                let owned = OwnedSessions::new(owner, existing)?;
                self.validator.check_admission_at(&owned, now)
            };

            match self.store.insert_admitted(session.clone(), admit).await {
                Ok(()) => {
                    tracing::info!(
                        session_id = %session.session_id,
                        %owner,
                        expires_at = session.expires_at,
                        max_transactions,
                        "session issued"
                    );
                    return Ok(session);
                }
                Err(StoreError::Duplicate(id)) if attempts < MAX_ID_ATTEMPTS => {
                    tracing::debug!(session_id = %id, attempts, "session id collision, retrying");
                }
                Err(StoreError::Admission(e)) => {
                    if let SessionError::TooManyActiveSessions { active, limit, .. } = &e {
                        tracing::debug!(%owner, active, limit, "admission refused");
                    }
                    return Err(e.into());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Authorizes one action by `caller` with session `id`.
    ///
    /// Runs the gate; on acceptance counts the action against the (possibly
    /// renewed) session and persists it. Returns the stored record.
    ///
    /// # Errors
    /// - [`TetherError::Rejected`] — the gate refused; nothing was written
    /// - [`StoreError::VersionConflict`] — another request wrote first
    pub async fn authorize(
        &self,
        id: SessionId,
        caller: &PlayerAddress,
    ) -> Result<SessionKey, TetherError> {
        let Some(stored) = self.store.get(id).await? else {
            tracing::debug!(session_id = %id, %caller, "unknown session");
            return Err(TetherError::Rejected(Rejection::NoSession));
        };

        let now = self.validator.now();
        let decision = self
            .validator
            .validate_and_maybe_renew_at(&stored.session, caller, now);

        if let Some(reason) = decision.rejection {
            tracing::debug!(session_id = %id, %caller, %reason, "session rejected");
            return Err(TetherError::Rejected(reason));
        }

        // The triggering action counts against the session the gate handed
        // back, so a renewal's fresh quota already includes it.
        let mut session = decision.session;
        session.used_transactions = session.used_transactions.saturating_add(1);
        let version = self.store.replace(session.clone(), stored.version).await?;

        if decision.renewed {
            tracing::info!(
                session_id = %id,
                old_expiry = stored.session.expires_at,
                expires_at = session.expires_at,
                version,
                "session renewed"
            );
        }
        Ok(session)
    }

    /// Revokes session `id`. Revoking an already-revoked session is a
    /// no-op.
    ///
    /// # Errors
    /// - [`StoreError::NotFound`] — unknown id
    /// - [`StoreError::VersionConflict`] — another request wrote first
    pub async fn revoke(&self, id: SessionId) -> Result<SessionKey, TetherError> {
        let stored = self.store.get(id).await?.ok_or(StoreError::NotFound(id))?;
        if !stored.session.is_valid {
            return Ok(stored.session);
        }

        // `revoke` only ever clears the flag; nothing sets it back.
        let mut session = stored.session;
        session.revoke();
        self.store.replace(session.clone(), stored.version).await?;

        tracing::info!(session_id = %id, owner = %session.player_address, "session revoked");
        Ok(session)
    }

    /// Classifies the stored session `id`.
    ///
    /// An unknown id classifies as [`StatusCode::Invalid`], the same as the
    /// sentinel. The caller does not influence the result.
    pub async fn status(
        &self,
        id: SessionId,
        caller: &PlayerAddress,
    ) -> Result<StatusCode, TetherError> {
        let now = self.validator.now();
        Ok(match self.store.get(id).await? {
            Some(stored) => self.validator.classify_at(&stored.session, caller, now),
            None => StatusCode::Invalid,
        })
    }
}

/// Picks a random non-zero session id.
///
/// The thread-local RNG is not `Send`, so it is created and dropped here
/// rather than held across an `.await`.
fn generate_session_id() -> SessionId {
    // `1..=` skips the `0` sentinel, so a minted id is never `NONE`.
    SessionId(rand::rng().random_range(1..=u64::MAX))
}
