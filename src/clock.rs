// Clock abstraction for freshness decisions.
// Injected so tests can pin "now" instead of sampling the system clock.

use chrono::{DateTime, Utc};

/// Source of the current time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;

    /// Current time as an ISO-8601 string (used by the synthesized
    /// dynamic-endpoint payload).
    fn now_iso(&self) -> String {
        DateTime::<Utc>::from_timestamp_millis(self.now_millis())
            .unwrap_or_else(Utc::now)
            .to_rfc3339()
    }
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock;
        let a = clock.now_millis();
        let b = clock.now_millis();
        assert!(b >= a);
    }

    #[test]
    fn test_iso_derives_from_millis() {
        struct Pinned;
        impl Clock for Pinned {
            fn now_millis(&self) -> i64 {
                0
            }
        }
        assert!(Pinned.now_iso().starts_with("1970-01-01T00:00:00"));
    }
}
