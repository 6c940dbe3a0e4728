//! Session key validation for Tether.
//!
//! This crate is the security-critical gate every privileged action passes
//! through. It answers two questions about a presented session key:
//!
//! 1. **Is it usable?** — the predicate layer ([`predicates`]), the status
//!    classifier ([`classify`]) and the boolean validator
//!    ([`SessionValidator::is_valid_for_action_at`]).
//! 2. **Should it be extended?** — the centralized gate
//!    ([`SessionValidator::validate_and_maybe_renew_at`]) renews sessions
//!    that are close to expiry instead of forcing re-authorization.
//!
//! It also decides whether a player may open another session
//! ([`OwnedSessions`] + [`SessionValidator::can_create_session_at`]) and
//! whether requested issuance parameters are in bounds.
//!
//! # How it fits in the stack
//!
//! ```text
//! Service layer (above)  ← loads sessions, persists renewed copies
//!     ↕
//! Session layer (this crate)  ← pure decisions over (session, caller, time)
//!     ↕
//! Protocol layer (below)  ← provides SessionKey, StatusCode
//! ```
//!
//! Nothing here performs I/O or holds shared mutable state. Every check
//! has a form that takes `now` explicitly; the ambient forms read a
//! [`Clock`] and delegate.

mod admission;
mod clock;
mod config;
mod error;
pub mod predicates;
mod status;
mod validator;

pub use admission::OwnedSessions;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{SessionConfig, defaults};
pub use error::SessionError;
pub use status::classify;
pub use validator::{GateDecision, Rejection, SessionValidator, rejection_reason, renew};
