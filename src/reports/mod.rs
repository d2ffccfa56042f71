pub mod summary;
pub mod tally;
pub mod timeline;
pub mod turnout;

/// Rounds to two decimal places, the precision every report rate is published at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole * 100`, rounded to two places. Zero when `whole` is zero.
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(part as f64 / whole as f64 * 100.0)
}
