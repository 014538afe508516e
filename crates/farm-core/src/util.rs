//! Small helpers shared by config handling, the remote client and the local store

/// Trimmed config or CLI text, with blank input treated as unset
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Whether a configured endpoint uses an HTTP scheme the remote client can reach
pub fn is_http_url(value: &str) -> bool {
    ["http://", "https://"]
        .iter()
        .any(|scheme| value.starts_with(*scheme))
}

/// Record summaries clipped for one line of `farm list` output (180 chars max)
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(180).collect()
}

/// Wall-clock milliseconds, used to stamp queued operations and stored records
pub fn unix_millis_now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
