//! Display helpers for distances and timestamps.

use chrono::{DateTime, Utc};

const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_HOUR: u64 = 3_600_000;
const MS_PER_DAY: u64 = 86_400_000;

/// Format a distance for display.
///
/// Below one kilometre the value is shown in whole metres (`"450m"`),
/// otherwise in kilometres with one decimal (`"1.2km"`).
pub fn format_distance(distance_km: f64) -> String {
    if distance_km < 1.0 {
        format!("{}m", (distance_km * 1000.0).round() as i64)
    } else {
        format!("{:.1}km", distance_km)
    }
}

/// Format a timestamp relative to `now_ms` (both Unix epoch milliseconds).
///
/// Returns `"just now"`, `"5m ago"`, `"3h ago"` or `"2d ago"` for anything
/// within the last week, and the UTC calendar date (`2024-03-01`) beyond that.
/// Timestamps in the future are treated as "just now".
pub fn format_relative_time(timestamp_ms: u64, now_ms: u64) -> String {
    let elapsed = now_ms.saturating_sub(timestamp_ms);

    if elapsed < MS_PER_MINUTE {
        return "just now".to_string();
    }
    if elapsed < MS_PER_HOUR {
        return format!("{}m ago", elapsed / MS_PER_MINUTE);
    }
    if elapsed < MS_PER_DAY {
        return format!("{}h ago", elapsed / MS_PER_HOUR);
    }
    if elapsed < 7 * MS_PER_DAY {
        return format!("{}d ago", elapsed / MS_PER_DAY);
    }

    i64::try_from(timestamp_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}
