use crate::error::{Result, TrackerError};
use crate::model::DateWindow;
use chrono::{Datelike, NaiveDate, Weekday};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a strict `YYYY-MM-DD` calendar date.
///
/// Anything that does not format back to the exact input (missing zero
/// padding, trailing time of day, other separators) is rejected.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    let date = NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|e| {
        TrackerError::InvalidDate(format!("'{input}' is not a YYYY-MM-DD date: {e}"))
    })?;

    if date.format(DATE_FORMAT).to_string() != trimmed {
        return Err(TrackerError::InvalidDate(format!(
            "'{input}' is not a YYYY-MM-DD date"
        )));
    }

    Ok(date)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Start date used when no `from` is configured: yesterday, or the Friday
/// before it when yesterday falls on a weekend.
pub fn default_start(today: NaiveDate) -> Result<NaiveDate> {
    let mut day = previous_day(today)?;
    while is_weekend(day) {
        day = previous_day(day)?;
    }
    Ok(day)
}

fn previous_day(date: NaiveDate) -> Result<NaiveDate> {
    date.pred_opt()
        .ok_or_else(|| TrackerError::InvalidDate(format!("No day precedes {date}")))
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Turn optional `from`/`to` inputs into a concrete window.
///
/// Explicit dates are used verbatim; only the defaulted start is
/// weekend-adjusted. An empty `to` means `today`.
pub fn resolve(raw_from: Option<&str>, raw_to: Option<&str>, today: NaiveDate) -> Result<DateWindow> {
    let start = match non_empty(raw_from) {
        Some(s) => parse_date(s)?,
        None => default_start(today)?,
    };

    let end = match non_empty(raw_to) {
        Some(s) => parse_date(s)?,
        None => today,
    };

    DateWindow::new(start, end)
}
