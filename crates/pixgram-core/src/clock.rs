//! Server-assigned timestamps.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};

/// Hands out strictly increasing UTC instants at microsecond resolution.
///
/// Two writes issued back to back always receive distinct timestamps, so
/// ordering by `timestamp` never depends on the document id tie-break for
/// writes coming from one process.
#[derive(Debug, Default)]
pub struct ServerClock {
    last_micros: AtomicI64,
}

impl ServerClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> DateTime<Utc> {
        let wall = Utc::now().timestamp_micros();
        let mut prev = self.last_micros.load(Ordering::Relaxed);
        loop {
            let next = wall.max(prev + 1);
            match self.last_micros.compare_exchange_weak(
                prev,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return DateTime::from_timestamp_micros(next).unwrap_or_else(Utc::now),
                Err(actual) => prev = actual,
            }
        }
    }

    /// Current instant rendered the way stores persist timestamps.
    pub fn now_string(&self) -> String {
        format_timestamp(self.now())
    }
}

/// RFC 3339, UTC, fixed microsecond precision. Lexicographic order equals
/// chronological order for every value produced here.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strictly_increasing() {
        let clock = ServerClock::new();
        let stamps: Vec<String> = (0..1000).map(|_| clock.now_string()).collect();
        for pair in stamps.windows(2) {
            assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_format_is_utc_micros() {
        let at = DateTime::from_timestamp_micros(1_700_000_000_123_456).unwrap();
        assert_eq!(format_timestamp(at), "2023-11-14T22:13:20.123456Z");
    }
}
