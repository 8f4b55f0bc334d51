//! Size and timestamp normalisation

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use crate::bridge::{RawSize, RawTimestamp};

/// Display format used when the bridge hands us a bare epoch value
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats tried in order for textual timestamps (interpreted as UTC)
const TEXT_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y/%m/%d %H:%M:%S"];

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Parse a raw size; anything unparsable is 0.
pub fn parse_size(raw: &RawSize) -> u64 {
    match raw {
        RawSize::Bytes(bytes) => *bytes,
        RawSize::Text(text) => text.trim().parse::<u64>().unwrap_or(0),
    }
}

/// Human-readable size, binary units
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Returns `(epoch_millis, display_string)`.
///
/// Textual timestamps keep their original string for display even when they
/// cannot be parsed (millis is then 0).
pub fn parse_timestamp(raw: &RawTimestamp) -> (i64, String) {
    match raw {
        RawTimestamp::Epoch(secs) => {
            let formatted = Utc
                .timestamp_opt(*secs, 0)
                .single()
                .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
                .unwrap_or_default();
            (secs.saturating_mul(1000), formatted)
        }
        RawTimestamp::Text(text) => (parse_text_timestamp(text).unwrap_or(0), text.clone()),
    }
}

fn parse_text_timestamp(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(secs) = text.parse::<i64>() {
        return Some(secs.saturating_mul(1000));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }
    TEXT_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(text, fmt)
            .ok()
            .map(|naive| naive.and_utc().timestamp_millis())
    })
}
