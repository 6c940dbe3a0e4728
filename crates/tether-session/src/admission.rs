//! Owner-tagged session sets for admission control.
//!
//! The admission check counts a player's active sessions and refuses a new
//! one once the limit is reached. Counting only works if every session in
//! the set really belongs to that player: a stray foreign session would be
//! counted against the wrong owner, and a missing one would let the player
//! slip past the limit.
//!
//! [`OwnedSessions`] makes the "these all belong to X" claim part of the
//! type. The only way to build one is through a constructor that checks
//! every session's owner, so the admission check never has to trust its
//! caller's filtering.

use tether_protocol::{PlayerAddress, SessionKey, Timestamp};

use crate::SessionError;
use crate::predicates::is_active;

/// A borrowed set of sessions, all owned by the same player.
#[derive(Debug, Clone, Copy)]
pub struct OwnedSessions<'a> {
    owner: &'a PlayerAddress,
    sessions: &'a [SessionKey],
}

impl<'a> OwnedSessions<'a> {
    /// Tags `sessions` as belonging to `owner`.
    ///
    /// # Errors
    /// Returns [`SessionError::ForeignSession`] for the first session whose
    /// `player_address` is not `owner`.
    pub fn new(
        owner: &'a PlayerAddress,
        sessions: &'a [SessionKey],
    ) -> Result<Self, SessionError> {
        if let Some(foreign) = sessions.iter().find(|s| s.player_address != *owner) {
            return Err(SessionError::ForeignSession {
                session_id: foreign.session_id,
                owner: owner.clone(),
                actual: foreign.player_address.clone(),
            });
        }
        Ok(Self { owner, sessions })
    }

    /// The player every session in the set belongs to.
    pub fn owner(&self) -> &PlayerAddress {
        self.owner
    }

    /// Number of sessions in the set (any state).
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if the player has no sessions at all.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'a, SessionKey> {
        self.sessions.iter()
    }

    /// Number of sessions that count against the admission limit at `now`.
    pub fn active_count(&self, now: Timestamp) -> usize {
        // Revoked, expired, exhausted and inactive sessions are still in the
        // set but no longer hold a slot.
        self.sessions.iter().filter(|s| is_active(s, now)).count()
    }
}

// Lets callers write `for session in owned { .. }` directly.
impl<'a> IntoIterator for OwnedSessions<'a> {
    type Item = &'a SessionKey;
    type IntoIter = std::slice::Iter<'a, SessionKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.sessions.iter()
    }
}
