use std::time::{SystemTime, UNIX_EPOCH};

pub const MILLIS_PER_MINUTE: i64 = 60_000;

pub fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System time is before Unix epoch")
        .as_secs() as i64
}

pub fn current_timestamp_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System time is before Unix epoch")
        .as_millis() as i64
}

/// Whole minutes elapsed between two millisecond timestamps.
///
/// Floor division of the delta; a negative or sub-minute delta counts as
/// zero so elapsed time can never be credited backwards.
pub fn elapsed_whole_minutes(start_ms: i64, end_ms: i64) -> i64 {
    let delta = end_ms - start_ms;
    if delta <= 0 {
        0
    } else {
        delta / MILLIS_PER_MINUTE
    }
}

pub fn is_expired(timestamp: i64, timeout: i64, current_time: i64) -> bool {
    current_time - timestamp > timeout
}
