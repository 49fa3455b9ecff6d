use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// How long the engine is allowed to think about a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchBudget(Duration);

impl SearchBudget {
    pub const fn new(duration: Duration) -> Self {
        Self(duration)
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    pub const fn duration(&self) -> Duration {
        self.0
    }

    /// Whole milliseconds, rounded down and saturated to `u64`.
    pub fn as_millis(&self) -> u64 {
        self.0.as_millis().try_into().unwrap_or(u64::MAX)
    }
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self(Duration::from_secs(3))
    }
}

impl From<Duration> for SearchBudget {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl fmt::Display for SearchBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.as_millis())
    }
}

#[derive(Debug, Error, Clone, Copy)]
#[error("invalid search budget")]
pub struct InvalidSearchBudget;

impl FromStr for SearchBudget {
    type Err = InvalidSearchBudget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s.trim()).map(Self).ok_or(InvalidSearchBudget)
    }
}

fn parse_duration(s: &str) -> Option<Duration> {
    fn secs(s: &str) -> Option<Duration> {
        let secs: f64 = s.parse().ok()?;
        if secs.is_sign_negative() || !secs.is_finite() || secs >= u64::MAX as f64 {
            return None;
        }
        Some(Duration::from_secs_f64(secs))
    }

    if let Some(s) = s.strip_suffix("ms") {
        return Some(secs(s)? / 1000);
    }
    if let Some(s) = s.strip_suffix("s") {
        return Some(secs(s)?);
    }
    if let Some(s) = s.strip_suffix("m") {
        return secs(s)?.checked_mul(60);
    }
    if let Some(s) = s.strip_suffix("h") {
        return secs(s)?.checked_mul(60 * 60);
    }
    secs(s)
}
