use chrono::{DateTime, TimeZone};

/// Human readable elapsed time between `created_at` and `now`, in the coarsest unit that is
/// at least one: `42s`, `5m`, `3h`, `12d`. A `created_at` in the future reads as `0s`.
pub fn format_age<Tz1: TimeZone, Tz2: TimeZone>(
    created_at: &DateTime<Tz1>,
    now: &DateTime<Tz2>,
) -> String {
    let elapsed = now.clone().signed_duration_since(created_at.clone());
    let seconds = elapsed.num_seconds().max(0);

    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 60 * 60 {
        format!("{}m", seconds / 60)
    } else if seconds < 24 * 60 * 60 {
        format!("{}h", seconds / (60 * 60))
    } else {
        format!("{}d", seconds / (24 * 60 * 60))
    }
}
