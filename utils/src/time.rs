//! Time formatting helpers.

/// Format a duration in seconds as hours, as used in response messages.
///
/// Whole hours print without a fraction; otherwise up to two decimals are
/// kept, truncated (5400 → `"1.5"`, 100 → `"0.02"`).
pub fn format_hours(secs: u64) -> String {
    let hundredths = secs as u128 * 100 / 3600;
    let whole = hundredths / 100;
    let frac = hundredths % 100;
    if frac == 0 {
        whole.to_string()
    } else if frac % 10 == 0 {
        format!("{}.{}", whole, frac / 10)
    } else {
        format!("{}.{:02}", whole, frac)
    }
}
