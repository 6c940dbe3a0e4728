//! Clock adapter: where "now" comes from.
//!
//! Every check in this crate has a form that takes `now` as an argument.
//! The [`Clock`] trait only feeds the ambient convenience forms on
//! [`SessionValidator`](crate::SessionValidator), so the time source can be
//! swapped for a [`ManualClock`] in tests without touching any logic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tether_protocol::Timestamp;

/// A source of the current time.
///
/// `Send + Sync` so a validator holding a clock can be shared across async
/// tasks.
pub trait Clock: Send + Sync {
    /// Current time in unix seconds.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        // A clock set before 1970 reads as the epoch.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0)
    }
}

/// A clock that only moves when told to.
///
/// Interior mutability via an atomic, so a shared `&ManualClock` (or an
/// `Arc<ManualClock>`) can be advanced while a validator holds it.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Creates a clock frozen at `now`.
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    /// Jumps to an absolute time.
    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Moves forward by `secs`.
    ///
    /// Takes `&self`: the atomic lets tests share one clock through an
    /// `Arc` with the validator and still move it.
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

// Forwarding impls. `?Sized` admits `Arc<dyn Clock>` as well.
impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_manual_clock_set_and_advance() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.now(), 100);

        clock.advance(50);
        assert_eq!(clock.now(), 150);

        clock.set(10);
        assert_eq!(clock.now(), 10);
    }

    #[test]
    fn test_shared_manual_clock_sees_updates() {
        let clock = Arc::new(ManualClock::new(0));
        let shared = Arc::clone(&clock);

        clock.advance(30);

        assert_eq!(shared.now(), 30);
    }

    #[test]
    fn test_system_clock_is_past_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now() > 1_577_836_800);
    }
}
