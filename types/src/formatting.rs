//! Centralized number formatting utilities.
//!
//! All numeric display formatting for reports goes through this module so
//! the CLI table and any future front end render values identically.

/// Format a millisecond duration as `M:SS.t`, or `H:MM:SS` past an hour.
///
/// # Examples
/// ```
/// use vigil_types::formatting::format_duration_ms;
/// assert_eq!(format_duration_ms(0), "0:00.0");
/// assert_eq!(format_duration_ms(9_300), "0:09.3");
/// assert_eq!(format_duration_ms(83_450), "1:23.4");
/// assert_eq!(format_duration_ms(3_725_000), "1:02:05");
/// ```
pub fn format_duration_ms(ms: i64) -> String {
    let ms = ms.max(0);
    let total_secs = ms / 1000;
    let tenths = (ms % 1000) / 100;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    if hours > 0 {
        format!("{hours}:{mins:02}:{secs:02}")
    } else {
        format!("{mins}:{secs:02}.{tenths}")
    }
}

/// Format a percentage value (0..=100) with one decimal.
///
/// # Examples
/// ```
/// use vigil_types::formatting::format_pct;
/// assert_eq!(format_pct(0.0), "0.0%");
/// assert_eq!(format_pct(97.26), "97.3%");
/// assert_eq!(format_pct(100.0), "100.0%");
/// ```
pub fn format_pct(pct: f64) -> String {
    format!("{pct:.1}%")
}

/// Format a large count with K/M suffix for compact display.
///
/// - Values >= 1,000,000 are formatted as `X.XXM`
/// - Values >= 1,000 are formatted as `X.XXK`
/// - Values below 1,000 are formatted as-is
///
/// # Examples
/// ```
/// use vigil_types::formatting::format_compact;
/// assert_eq!(format_compact(500), "500");
/// assert_eq!(format_compact(1_500), "1.50K");
/// assert_eq!(format_compact(15_000), "15.00K");
/// assert_eq!(format_compact(1_500_000), "1.50M");
/// ```
pub fn format_compact(n: i64) -> String {
    if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        format!("{n}")
    }
}
