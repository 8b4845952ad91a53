//! Date-range helpers shared by pricing and calendar sync.

use chrono::NaiveDate;

use crate::{CoreError, CoreResult};

pub const ISO_DATE: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` request value.
pub fn parse_iso_date(field: &str, value: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), ISO_DATE).map_err(|_| {
        CoreError::validation(format!(
            "Invalid {} date '{}'. Expected YYYY-MM-DD",
            field, value
        ))
    })
}

/// Nights of a stay: `[check_in, check_out)`. Empty when the range is not positive.
pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    check_in.iter_days().take_while(move |day| *day < check_out)
}

/// Number of nights in `[check_in, check_out)`, never negative.
pub fn night_count(check_in: NaiveDate, check_out: NaiveDate) -> usize {
    (check_out - check_in).num_days().max(0) as usize
}

/// Every date of the closed interval `[start, end]`. Empty when `end < start`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}
