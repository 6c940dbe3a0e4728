//! The status classifier.

use tether_protocol::{SessionKey, StatusCode, Timestamp};

use crate::predicates::{has_quota, is_expired};

/// Maps a session to exactly one [`StatusCode`] at `now`.
///
/// Checks run in strict priority order and the first match wins:
///
/// ```text
/// session_id == 0  → Invalid
/// !is_valid        → Revoked
/// status != 0      → Inactive
/// now >= expires   → Expired
/// used >= max      → Exhausted
/// otherwise        → Valid
/// ```
///
/// Later checks only mean something once earlier ones pass, so a revoked
/// session reads `Revoked` even if it is also expired.
///
/// Ownership is not considered. A status code describes the session in
/// the abstract; whether a particular caller may use it is the boolean
/// validator's question.
pub fn classify(session: &SessionKey, now: Timestamp) -> StatusCode {
    // An `if`/`else if` chain rather than a `match`: the order of the arms
    // *is* the priority, and each arm reads a different field.
    if session.session_id.is_none() {
        StatusCode::Invalid
    } else if !session.is_valid {
        StatusCode::Revoked
    } else if session.status != 0 {
        StatusCode::Inactive
    } else if is_expired(session, now) {
        StatusCode::Expired
    } else if !has_quota(session) {
        StatusCode::Exhausted
    } else {
        StatusCode::Valid
    }
}
