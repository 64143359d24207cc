//! Date handling for MODIS composite time series.

use chrono::NaiveDate;

/// Parse a MODIS `YYYYDDD` (year + day-of-year) date token.
///
/// Product filenames embed acquisition dates as `A2003001` (the leading `A`
/// stripped by the caller) and ASCII exports as `2003001`.
pub fn parse_yyyyddd(token: &str) -> Result<NaiveDate, TimeParseError> {
    if token.len() != 7 {
        return Err(TimeParseError::InvalidToken(token.to_string()));
    }
    let year: i32 = token[0..4]
        .parse()
        .map_err(|_| TimeParseError::InvalidToken(token.to_string()))?;
    let doy: u32 = token[4..7]
        .parse()
        .map_err(|_| TimeParseError::InvalidToken(token.to_string()))?;

    NaiveDate::from_yo_opt(year, doy).ok_or_else(|| TimeParseError::InvalidToken(token.to_string()))
}

/// Estimate the composite step of a time series in days.
///
/// The mean spacing between consecutive dates, rounded to whole days.
/// Daily series report 1; 8-day composites report 8. Series shorter than
/// two dates report 0.
pub fn composite_step_days(times: &[NaiveDate]) -> i64 {
    if times.len() < 2 {
        return 0;
    }
    let total: i64 = times
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .sum();
    let mean = total as f64 / (times.len() - 1) as f64;
    mean.round() as i64
}

#[derive(Debug, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid YYYYDDD date token: {0}")]
    InvalidToken(String),
}
