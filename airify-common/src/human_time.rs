//! Human-readable track duration formatting
//!
//! Track lengths are displayed the way playlist UIs show them: `M:SS` for
//! anything under an hour, `H:MM:SS` above.

const SECONDS_PER_HOUR: u64 = 3600;

/// Format a duration in milliseconds as `M:SS` or `H:MM:SS`.
///
/// Sub-second remainders are truncated, so a 59.9 s track shows as `0:59`.
///
/// # Examples
///
/// ```
/// use airify_common::human_time::format_track_duration;
///
/// assert_eq!(format_track_duration(0), "0:00");
/// assert_eq!(format_track_duration(215_000), "3:35");
/// assert_eq!(format_track_duration(3_725_000), "1:02:05");
/// ```
pub fn format_track_duration(duration_ms: u64) -> String {
    let total_seconds = duration_ms / 1000;

    if total_seconds >= SECONDS_PER_HOUR {
        let hours = total_seconds / SECONDS_PER_HOUR;
        let mins = (total_seconds % SECONDS_PER_HOUR) / 60;
        let secs = total_seconds % 60;
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        let mins = total_seconds / 60;
        let secs = total_seconds % 60;
        format!("{}:{:02}", mins, secs)
    }
}
