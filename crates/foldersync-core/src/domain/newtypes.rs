//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for user-supplied values.
//! Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// SyncInterval
// ============================================================================

/// Number of seconds between the starts of two consecutive sync ticks
///
/// SyncInterval ensures the value is strictly positive. Zero and negative
/// values are rejected at construction, so the scheduler never has to deal
/// with them at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u64")]
pub struct SyncInterval(u64);

impl SyncInterval {
    /// Shortest allowed interval: one second
    pub const MIN: SyncInterval = SyncInterval(1);

    /// Create a new SyncInterval from a signed number of seconds
    ///
    /// Signed input is accepted so that negative values coming from the
    /// command line surface as a validation error instead of a parse error.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidInterval` if `seconds <= 0`
    pub fn new(seconds: i64) -> Result<Self, DomainError> {
        if seconds <= 0 {
            return Err(DomainError::InvalidInterval(format!(
                "must be greater than 0, got {seconds}"
            )));
        }
        Ok(Self(seconds as u64))
    }

    /// Interval length in whole seconds
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.0
    }

    /// Interval as a [`Duration`]
    #[must_use]
    pub const fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Display for SyncInterval {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl FromStr for SyncInterval {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let seconds: i64 = s.trim().parse().map_err(|e| {
            DomainError::InvalidInterval(format!("not an integer number of seconds: {s:?} ({e})"))
        })?;
        Self::new(seconds)
    }
}

impl TryFrom<i64> for SyncInterval {
    type Error = DomainError;

    fn try_from(seconds: i64) -> Result<Self, Self::Error> {
        Self::new(seconds)
    }
}

impl From<SyncInterval> for u64 {
    fn from(interval: SyncInterval) -> Self {
        interval.0
    }
}

impl From<SyncInterval> for Duration {
    fn from(interval: SyncInterval) -> Self {
        interval.as_duration()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_positive() {
        let interval = SyncInterval::new(30).unwrap();
        assert_eq!(interval.as_secs(), 30);
        assert_eq!(interval.as_duration(), Duration::from_secs(30));
    }

    #[test]
    fn test_new_rejects_zero_and_negative() {
        assert!(matches!(
            SyncInterval::new(0),
            Err(DomainError::InvalidInterval(_))
        ));
        assert!(matches!(
            SyncInterval::new(-5),
            Err(DomainError::InvalidInterval(_))
        ));
    }

    #[test]
    fn test_from_str() {
        let interval: SyncInterval = "10".parse().unwrap();
        assert_eq!(interval.as_secs(), 10);

        assert!("-1".parse::<SyncInterval>().is_err());
        assert!("ten".parse::<SyncInterval>().is_err());
        assert!("1.5".parse::<SyncInterval>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(SyncInterval::new(45).unwrap().to_string(), "45s");
    }

    #[test]
    fn test_serde_rejects_non_positive() {
        let interval: SyncInterval = serde_json::from_str("12").unwrap();
        assert_eq!(interval.as_secs(), 12);
        assert_eq!(serde_json::to_string(&interval).unwrap(), "12");

        let result: Result<SyncInterval, _> = serde_json::from_str("0");
        assert!(result.is_err());
    }
}
