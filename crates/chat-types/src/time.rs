//! Timestamp unit handling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unit of `Message::timestamp` for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampUnit {
    /// Unix seconds
    #[default]
    Seconds,
    /// Unix milliseconds
    Milliseconds,
}

impl TimestampUnit {
    /// Native ticks per second.
    pub fn per_second(self) -> i64 {
        match self {
            TimestampUnit::Seconds => 1,
            TimestampUnit::Milliseconds => 1000,
        }
    }

    /// Convert a duration in seconds to native ticks.
    pub fn from_secs(self, secs: i64) -> i64 {
        secs.saturating_mul(self.per_second())
    }

    /// Convert a native span to fractional seconds.
    pub fn to_secs(self, span: i64) -> f64 {
        span as f64 / self.per_second() as f64
    }

    /// Interpret a native timestamp as a UTC instant.
    pub fn to_datetime(self, timestamp: i64) -> Option<DateTime<Utc>> {
        match self {
            TimestampUnit::Seconds => DateTime::from_timestamp(timestamp, 0),
            TimestampUnit::Milliseconds => DateTime::from_timestamp_millis(timestamp),
        }
    }
}

impl std::fmt::Display for TimestampUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimestampUnit::Seconds => write!(f, "seconds"),
            TimestampUnit::Milliseconds => write!(f, "milliseconds"),
        }
    }
}
