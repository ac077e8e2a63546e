//! Clock formatting and duration helpers

use std::time::Duration;

/// Format seconds as `M:SS` for the player's elapsed/duration labels
///
/// Negative and non-finite inputs display as `0:00`. Minutes are not
/// wrapped into hours.
///
/// # Examples
///
/// ```
/// use folio_common::time::format_clock;
///
/// assert_eq!(format_clock(0.0), "0:00");
/// assert_eq!(format_clock(65.9), "1:05");
/// assert_eq!(format_clock(3725.0), "62:05");
/// ```
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Convert milliseconds to duration
pub fn millis_to_duration(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
