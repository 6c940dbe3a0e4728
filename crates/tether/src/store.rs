//! The storage seam: where session records live between requests.
//!
//! Tether's decisions are pure; something still has to hold the records
//! and arbitrate concurrent writers. That something implements
//! [`SessionStore`]. Production deployments back it with a database; the
//! bundled [`MemorySessionStore`] is enough for tests and demos.
//!
//! # Versioned writes
//!
//! Every record carries a version that increments on each successful
//! write. [`SessionStore::replace`] is a compare-and-swap: it only writes
//! if the stored version still equals the one the caller read. Two
//! requests that both see a session inside its renewal window will both
//! compute a renewal; only the first `replace` lands, the second gets
//! [`StoreError::VersionConflict`]. That keeps `used_transactions`
//! accounting exact without any locking in the validation layer.
//!
//! # Admitted inserts
//!
//! Issuing a session is a read (the owner's existing sessions), a decision
//! (is the owner under the limit?) and a write. Run as three calls, twenty
//! concurrent issues for one player all read "zero active" and all insert.
//! [`SessionStore::insert_admitted`] hands the decision to the store so it
//! runs inside the same critical section as the write.

use std::collections::HashMap;

use tether_protocol::{Codec, JsonCodec, PlayerAddress, ProtocolError, SessionId, SessionKey};
use tether_session::SessionError;
use tokio::sync::Mutex;

/// Errors reported by a [`SessionStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record with this id.
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// `insert` was given an id that already exists.
    #[error("session {0} already exists")]
    Duplicate(SessionId),

    /// Someone else wrote the record since it was read.
    #[error("session {id} was modified concurrently (expected version {expected}, found {actual})")]
    VersionConflict {
        id: SessionId,
        expected: u64,
        actual: u64,
    },

    /// The admission check passed to `insert_admitted` refused the write.
    #[error("admission refused: {0}")]
    Admission(SessionError),

    /// A stored record couldn't be encoded or decoded.
    #[error("stored record unreadable: {0}")]
    Codec(#[from] ProtocolError),
}

/// A session record together with its write version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned {
    pub session: SessionKey,
    pub version: u64,
}

/// Persistent home for session records.
///
/// # Trait bounds
///
/// - `Send + Sync` → one store is shared by every request task.
/// - `'static` → it lives as long as the service.
///
/// The methods return `Send` futures so a service holding the store can
/// be driven from `tokio::spawn`.
pub trait SessionStore: Send + Sync + 'static {
    /// Loads one record, or `None` if the id is unknown.
    fn get(
        &self,
        id: SessionId,
    ) -> impl std::future::Future<Output = Result<Option<Versioned>, StoreError>> + Send;

    /// Loads every record owned by `owner`, in any state.
    ///
    /// Implementations must return only that owner's sessions.
    fn list_for_owner(
        &self,
        owner: &PlayerAddress,
    ) -> impl std::future::Future<Output = Result<Vec<SessionKey>, StoreError>> + Send;

    /// Stores a new record at version 1.
    ///
    /// # Errors
    /// [`StoreError::Duplicate`] if the id is taken.
    fn insert(
        &self,
        session: SessionKey,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Stores a new record at version 1 if `admit` accepts the owner's
    /// current sessions.
    ///
    /// `admit` sees every record owned by `session.player_address`, in any
    /// state, and must run atomically with the insert: no other
    /// `insert_admitted` for the same owner may land between the check and
    /// the write.
    ///
    /// The service re-checks ownership inside `admit`, so a store that
    /// hands over a foreign record gets `SessionError::ForeignSession` back.
    ///
    /// # Errors
    /// - [`StoreError::Duplicate`] — the id is taken
    /// - [`StoreError::Admission`] — `admit` returned an error
    fn insert_admitted<F>(
        &self,
        session: SessionKey,
        admit: F,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send
    where
        F: FnOnce(&[SessionKey]) -> Result<(), SessionError> + Send;

    /// Overwrites a record if its version is still `expected_version`.
    ///
    /// Returns the new version.
    ///
    /// # Errors
    /// - [`StoreError::NotFound`] — no record with this id
    /// - [`StoreError::VersionConflict`] — the record moved on
    fn replace(
        &self,
        session: SessionKey,
        expected_version: u64,
    ) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;
}

// ---------------------------------------------------------------------------
// MemorySessionStore
// ---------------------------------------------------------------------------

/// An in-process [`SessionStore`].
///
/// Records are kept encoded through a [`Codec`] (JSON by default), the same
/// way an external store would hold them, so a record that can't survive
/// the wire fails here too.
pub struct MemorySessionStore<K: Codec = JsonCodec> {
    records: Mutex<HashMap<SessionId, StoredRecord>>,
    codec: K,
}

struct StoredRecord {
    owner: PlayerAddress,
    bytes: Vec<u8>,
    version: u64,
}

impl MemorySessionStore<JsonCodec> {
    /// Creates an empty store using JSON encoding.
    pub fn new() -> Self {
        Self::with_codec(JsonCodec)
    }
}

impl Default for MemorySessionStore<JsonCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Codec> MemorySessionStore<K> {
    pub fn with_codec(codec: K) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            codec,
        }
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    // Helpers take the already-locked map so callers decide how long the
    // guard lives.

    fn decode_owned(
        &self,
        records: &HashMap<SessionId, StoredRecord>,
        owner: &PlayerAddress,
    ) -> Result<Vec<SessionKey>, StoreError> {
        // `owner` is kept beside the bytes so filtering never decodes
        // another player's records.
        records
            .values()
            .filter(|record| record.owner == *owner)
            .map(|record| self.codec.decode(&record.bytes).map_err(StoreError::from))
            .collect()
    }

    fn put_new(records: &mut HashMap<SessionId, StoredRecord>, session: SessionKey, bytes: Vec<u8>) {
        records.insert(
            session.session_id,
            StoredRecord {
                owner: session.player_address,
                bytes,
                version: 1,
            },
        );
    }
}

impl<K: Codec> SessionStore for MemorySessionStore<K> {
    async fn get(&self, id: SessionId) -> Result<Option<Versioned>, StoreError> {
        let records = self.records.lock().await;
        let Some(record) = records.get(&id) else {
            return Ok(None);
        };
        let session = self.codec.decode(&record.bytes)?;
        Ok(Some(Versioned {
            session,
            version: record.version,
        }))
    }

    async fn list_for_owner(&self, owner: &PlayerAddress) -> Result<Vec<SessionKey>, StoreError> {
        let records = self.records.lock().await;
        self.decode_owned(&records, owner)
    }

    async fn insert(&self, session: SessionKey) -> Result<(), StoreError> {
        let bytes = self.codec.encode(&session)?;
        let mut records = self.records.lock().await;
        if records.contains_key(&session.session_id) {
            return Err(StoreError::Duplicate(session.session_id));
        }
        Self::put_new(&mut records, session, bytes);
        Ok(())
    }

    async fn insert_admitted<F>(&self, session: SessionKey, admit: F) -> Result<(), StoreError>
    where
        F: FnOnce(&[SessionKey]) -> Result<(), SessionError> + Send,
    {
        let bytes = self.codec.encode(&session)?;

        // The guard is held from the owner scan through the insert. A second
        // issue for the same owner waits here and then sees this record.
        let mut records = self.records.lock().await;
        if records.contains_key(&session.session_id) {
            return Err(StoreError::Duplicate(session.session_id));
        }
        let existing = self.decode_owned(&records, &session.player_address)?;
        admit(&existing).map_err(StoreError::Admission)?;

        Self::put_new(&mut records, session, bytes);
        Ok(())
    }

    async fn replace(&self, session: SessionKey, expected_version: u64) -> Result<u64, StoreError> {
        let bytes = self.codec.encode(&session)?;
        let mut records = self.records.lock().await;
        let record = records
            .get_mut(&session.session_id)
            .ok_or(StoreError::NotFound(session.session_id))?;

        if record.version != expected_version {
            return Err(StoreError::VersionConflict {
                id: session.session_id,
                expected: expected_version,
                actual: record.version,
            });
        }

        // Compare-and-swap: the version check and the write happen under one
        // guard, so exactly one of two racing writers gets through.
        record.bytes = bytes;
        record.version += 1;
        Ok(record.version)
    }
}
