//! # Clock
//!
//! The source of "now" for expiry checks and the rule engine's validation
//! clock. Callers sample a clock once per operation and reuse the instant.

use crate::temporal::Timestamp;

/// A source of the current UTC instant.
pub trait Clock: Send + Sync {
    /// The current instant, truncated to seconds.
    fn now(&self) -> Timestamp;
}

/// Reads the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn fixed_clock_is_stable() {
        let ts = Timestamp::parse("2026-03-01T08:00:00Z").unwrap();
        let clock = FixedClock(ts);
        assert_eq!(clock.now(), ts);
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn system_clock_has_no_subseconds() {
        assert_eq!(SystemClock.now().as_datetime().nanosecond(), 0);
    }

    #[test]
    fn clock_through_reference_and_arc() {
        let ts = Timestamp::parse("2026-03-01T08:00:00Z").unwrap();
        let fixed = FixedClock(ts);
        let by_ref: &dyn Clock = &fixed;
        assert_eq!(by_ref.now(), ts);
        let shared = std::sync::Arc::new(fixed);
        assert_eq!(shared.now(), ts);
    }
}
