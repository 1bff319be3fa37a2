use std::time::{SystemTime, UNIX_EPOCH};

/// Get the current system time in milliseconds from epoch.
///
/// Returns 0 if the system clock is set before epoch.
#[must_use]
pub fn now_millis() -> u64 {
    millis_since_epoch(SystemTime::now())
}

/// Converts a point in time to milliseconds from epoch, saturating at the
/// bounds of `u64`.
#[must_use]
pub fn millis_since_epoch(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map_or(0, |since| u64::try_from(since.as_millis()).unwrap_or(u64::MAX))
}
