//! Human-readable travel durations

/// Format a duration in seconds as Traditional Chinese hours and minutes
///
/// Rounds to the nearest minute first, so 3599 s reads "1 小時 0 分" rather
/// than "60 分鐘".
///
/// # Examples
/// ```
/// use trip_eta::estimator::format::format_duration;
///
/// assert_eq!(format_duration(16_745), "4 小時 39 分");
/// assert_eq!(format_duration(1_500), "25 分鐘");
/// ```
pub fn format_duration(total_secs: u64) -> String {
    let minutes = (total_secs + 30) / 60;
    let (hours, minutes) = (minutes / 60, minutes % 60);

    if hours > 0 {
        format!("{} 小時 {} 分", hours, minutes)
    } else {
        format!("{} 分鐘", minutes)
    }
}
