//! # Tether
//!
//! Session key validation and auto-renewal for delegated player actions.
//!
//! A player authorizes a session key that may act for them for a bounded
//! time and a bounded number of transactions. Tether decides whether a
//! presented key is usable by a given caller right now, and quietly
//! extends keys that are about to expire instead of forcing the player to
//! re-authorize.
//!
//! The decisions themselves live in [`tether_session`] and are pure. This
//! crate adds the pieces around them:
//!
//! - [`SessionStore`] — the storage seam, with a versioned
//!   compare-and-swap write so concurrent renewals can't both win.
//! - [`MemorySessionStore`] — an in-process store for tests and demos.
//! - [`SessionService`] — issue / authorize / revoke / inspect on top of a
//!   store and a validator.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tether::prelude::*;
//!
//! # async fn run() -> Result<(), TetherError> {
//! let service = SessionService::builder().build(MemorySessionStore::new())?;
//! let player = PlayerAddress::new("0xabc");
//!
//! let session = service.issue(&player, 3_600, 100).await?;
//! let after = service.authorize(session.session_id, &player).await?;
//! assert_eq!(after.used_transactions, 1);
//! # Ok(())
//! # }
//! ```

mod error;
mod service;
mod store;

pub use error::TetherError;
pub use service::{SessionService, SessionServiceBuilder};
pub use store::{MemorySessionStore, SessionStore, StoreError, Versioned};

pub use tether_protocol;
pub use tether_session;

/// Everything needed to run a session service, in one import.
pub mod prelude {
    pub use crate::{
        MemorySessionStore, SessionService, SessionServiceBuilder, SessionStore, StoreError,
        TetherError, Versioned,
    };
    pub use tether_protocol::{
        Codec, JsonCodec, PlayerAddress, SessionId, SessionKey, StatusCode, Timestamp,
    };
    pub use tether_session::{
        Clock, GateDecision, ManualClock, OwnedSessions, Rejection, SessionConfig,
        SessionError, SessionValidator, SystemClock,
    };
}
