//! Time types for TRACE.ORACLE.
//!
//! Trace records carry a floating-point Unix timestamp plus a human-readable
//! rendering of it. Rendering is always UTC so the same seed yields the same
//! files on every machine.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// `Time` field layout, millisecond precision.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Wall clock timestamp split into whole seconds and nanoseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp {
    /// Whole seconds since the epoch
    pub seconds: i64,
    /// Sub-second part
    pub nanos: u32,
}

impl Timestamp {
    /// Maximum nanoseconds per second
    pub const NANOS_PER_SEC: u32 = 1_000_000_000;

    /// Create a new timestamp
    #[must_use]
    pub fn new(seconds: i64, nanos: u32) -> Self {
        Self {
            seconds: seconds + i64::from(nanos / Self::NANOS_PER_SEC),
            nanos: nanos % Self::NANOS_PER_SEC,
        }
    }

    /// Split a floating-point second count
    #[must_use]
    pub fn from_secs_f64(secs: f64) -> Self {
        let whole = secs.floor();
        let frac = ((secs - whole) * f64::from(Self::NANOS_PER_SEC)) as u32;
        Self::new(whole as i64, frac.min(Self::NANOS_PER_SEC - 1))
    }

    /// Floating-point second count
    #[must_use]
    pub fn as_secs_f64(&self) -> f64 {
        self.seconds as f64 + f64::from(self.nanos) / f64::from(Self::NANOS_PER_SEC)
    }

    /// Current wall clock time
    #[must_use]
    pub fn now() -> Self {
        let now = Utc::now();
        Self::new(now.timestamp(), now.timestamp_subsec_nanos())
    }

    /// Render as `YYYY-MM-DD HH:MM:SS.mmm` (UTC, milliseconds truncated)
    #[must_use]
    pub fn render(&self) -> String {
        match DateTime::<Utc>::from_timestamp(self.seconds, self.nanos) {
            Some(dt) => dt.format(TIME_FORMAT).to_string(),
            None => format!("{}.{:03}", self.seconds, self.nanos / 1_000_000),
        }
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:09}", self.seconds, self.nanos)
    }
}

/// Render a record timestamp the way the `Time` field expects.
#[must_use]
pub fn render_time(secs: f64) -> String {
    Timestamp::from_secs_f64(secs).render()
}

/// Parse a `Time` field back into Unix seconds (fraction optional).
#[must_use]
pub fn parse_time(text: &str) -> Option<f64> {
    let parsed = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S"))
        .ok()?;
    let utc = parsed.and_utc();
    Some(Timestamp::new(utc.timestamp(), utc.timestamp_subsec_nanos()).as_secs_f64())
}

/// RFC 3339 rendering of the current instant, for report metadata.
#[must_use]
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_epoch() {
        assert_eq!(render_time(0.0), "1970-01-01 00:00:00.000");
    }

    #[test]
    fn test_render_truncates_millis() {
        // 1.9999 s must not round up to 2.000
        assert_eq!(render_time(1.9999), "1970-01-01 00:00:01.999");
    }

    #[test]
    fn test_render_known_instant() {
        let ts = 1_700_000_000.25;
        assert_eq!(render_time(ts), "2023-11-14 22:13:20.250");
    }

    #[test]
    fn test_parse_time_roundtrip_to_second() {
        let secs = parse_time("2023-11-14 22:13:20.250").unwrap();
        assert!((secs - 1_700_000_000.25).abs() < 1e-6);
        let whole = parse_time("2023-11-14 22:13:20").unwrap();
        assert!((whole - 1_700_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        assert!(parse_time("yesterday at noon").is_none());
    }

    #[test]
    fn test_timestamp_normalizes_nanos() {
        let ts = Timestamp::new(1, 1_500_000_000);
        assert_eq!(ts.seconds, 2);
        assert_eq!(ts.nanos, 500_000_000);
    }

    #[test]
    fn test_timestamp_display() {
        let ts = Timestamp::new(3, 7);
        assert_eq!(ts.to_string(), "3.000000007");
    }
}
