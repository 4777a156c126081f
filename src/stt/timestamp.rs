use chrono::{Local, Utc};

/// Absolute session time of a segment, formatted as zero-padded `mm:ss`.
///
/// Minutes keep counting past 59 so that long sessions stay sortable.
pub fn absolute_time(window_offset_secs: f64, segment_start_secs: f64) -> String {
    let total = (window_offset_secs + segment_start_secs).max(0.0).floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Local wall-clock time as `HH:MM:SS`.
pub fn wall_clock_time() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// Milliseconds since the Unix epoch.
pub fn epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}
