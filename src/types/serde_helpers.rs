//! Custom serde deserializers for flexible type handling
//!
//! Durations arrive in different shapes depending on the source: yt-dlp emits
//! integers or floats, some Invidious builds emit numeric strings, and missing
//! values show up as `null`.

use serde::{Deserialize, Deserializer, de};

/// Deserialize a second count that can be:
/// - Integer: `213`
/// - Float: `213.4` (truncated)
/// - String: `"213"`
/// - `null` or absent: `None`
///
/// Negative numbers and non-numeric strings are rejected.
pub fn deserialize_flexible_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleSeconds {
        Int(i64),
        Float(f64),
        String(String),
    }

    let value: Option<FlexibleSeconds> = Option::deserialize(deserializer)?;

    match value {
        None => Ok(None),
        Some(FlexibleSeconds::Int(i)) => u64::try_from(i)
            .map(Some)
            .map_err(|_| de::Error::custom(format!("negative duration: {}", i))),
        Some(FlexibleSeconds::Float(f)) => {
            if f.is_finite() && f >= 0.0 {
                Ok(Some(f as u64))
            } else {
                Err(de::Error::custom(format!("invalid duration: {}", f)))
            }
        }
        Some(FlexibleSeconds::String(s)) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid duration string: {}", s))),
    }
}
