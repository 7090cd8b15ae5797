//! Wall-clock time as seen by the capability core
//!
//! Deadlines (`expires`, `expiresIfUnused`) and creation stamps are absolute milliseconds
//! since the Unix epoch. The core never reads the system clock itself; it asks a
//! [`PhysicalTimeEffects`](crate::effects::PhysicalTimeEffects) handler.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Milliseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhysicalTime {
    /// Milliseconds since the Unix epoch
    pub ts_ms: u64,
}

impl PhysicalTime {
    /// Construct from milliseconds since the epoch
    pub const fn from_millis(ts_ms: u64) -> Self {
        Self { ts_ms }
    }

    /// This time shifted forward by `ms`, saturating
    pub fn plus_millis(self, ms: u64) -> Self {
        Self {
            ts_ms: self.ts_ms.saturating_add(ms),
        }
    }

    /// Whether a deadline at `self` has lapsed at `now`. A deadline equal to `now` has lapsed.
    pub fn has_lapsed_at(self, now: PhysicalTime) -> bool {
        self.ts_ms <= now.ts_ms
    }
}

impl fmt::Display for PhysicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.ts_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_lapses_inclusively() {
        let deadline = PhysicalTime::from_millis(1_000);
        assert!(!deadline.has_lapsed_at(PhysicalTime::from_millis(999)));
        assert!(deadline.has_lapsed_at(PhysicalTime::from_millis(1_000)));
        assert!(deadline.has_lapsed_at(PhysicalTime::from_millis(1_001)));
    }

    #[test]
    fn test_plus_millis_saturates() {
        assert_eq!(
            PhysicalTime::from_millis(u64::MAX).plus_millis(5),
            PhysicalTime::from_millis(u64::MAX)
        );
    }
}
