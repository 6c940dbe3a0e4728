//! Unified error type for Tether.

use tether_protocol::ProtocolError;
use tether_session::{Rejection, SessionError};

use crate::StoreError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TetherError {
    /// A protocol-level error (encode, decode, unknown status code).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (config, issuance bounds, admission).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A store-level error (missing record, version conflict).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The gate refused the session for this caller.
    #[error("session rejected: {0}")]
    Rejected(Rejection),
}
