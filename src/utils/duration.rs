//! Conversions between human durations (`3:33`, `1:02:03`) and seconds

/// Parse a colon-separated duration into seconds.
///
/// Accepts `SS`, `M:SS` and `H:MM:SS`. Returns `None` for empty input, the
/// literal `"None"` some search backends emit, or anything non-numeric.
pub fn time_to_seconds(text: &str) -> Option<u64> {
    let text = text.trim();
    if text.is_empty() || text == "None" {
        return None;
    }

    let mut total: u64 = 0;
    let mut parts = 0;
    for part in text.split(':') {
        let value: u64 = part.trim().parse().ok()?;
        total = total.checked_mul(60)?.checked_add(value)?;
        parts += 1;
    }

    (parts <= 3).then_some(total)
}

/// Format seconds as `M:SS`, or `H:MM:SS` past the hour
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
