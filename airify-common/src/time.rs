//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Milliseconds elapsed between `start` and `now`, zero if `now` precedes `start`
pub fn elapsed_ms(start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (now - start).num_milliseconds().max(0) as u64
}

/// Remaining milliseconds of a track of `duration_ms` started at `start`
///
/// Saturates at zero once the track has overrun its nominal duration.
pub fn remaining_ms(duration_ms: u64, start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    duration_ms.saturating_sub(elapsed_ms(start, now))
}
