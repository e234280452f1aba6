/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Milliseconds in one day
pub const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Whether a millisecond timestamp is more than `max_age_ms` before `now`
pub fn is_older_than(created_at: i64, max_age_ms: i64, now: i64) -> bool {
    now.saturating_sub(created_at) > max_age_ms
}
