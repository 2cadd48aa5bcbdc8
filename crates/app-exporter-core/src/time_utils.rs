use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

/// Layout of the cordon-until annotation, without the fractional seconds.
pub const CORDON_UNTIL_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CordonTimeError {
    #[error("cordon-until value is empty")]
    Empty,
    #[error("parsing timestamp '{input}' failed: {reason}")]
    Invalid { input: String, reason: String },
}

/// Parses a cordon-until value such as `2019-12-31T23:59:59.000` as UTC.
///
/// Everything from the first `.` onward is discarded. Timezone suffixes are
/// not accepted.
pub fn parse_cordon_until(input: &str) -> Result<DateTime<Utc>, CordonTimeError> {
    let seconds_part = input.split('.').next().unwrap_or_default();
    if seconds_part.is_empty() {
        return Err(CordonTimeError::Empty);
    }

    NaiveDateTime::parse_from_str(seconds_part, CORDON_UNTIL_LAYOUT)
        .map(|naive| naive.and_utc())
        .map_err(|error| CordonTimeError::Invalid {
            input: seconds_part.to_string(),
            reason: error.to_string(),
        })
}
