//! Year-less calendar position used by season boundaries.
//!
//! Seasons are stored as fixed-width `MM-DD` text. The derived ordering on
//! `(month, day)` is identical to lexical ordering of that zero-padded text,
//! so comparisons never depend on string formatting.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::CoreError;

const DAYS_IN_MONTH: [u8; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthDay {
    // Field order drives the derived Ord.
    month: u8,
    day: u8,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> Result<Self, CoreError> {
        if !(1..=12).contains(&month) {
            return Err(CoreError::validation(format!("month {} out of range", month)));
        }
        let max_day = DAYS_IN_MONTH[(month - 1) as usize] as u32;
        if day == 0 || day > max_day {
            return Err(CoreError::validation(format!(
                "day {} out of range for month {}",
                day, month
            )));
        }
        Ok(Self {
            month: month as u8,
            day: day as u8,
        })
    }

    /// Drops the year from a calendar date.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: date.month() as u8,
            day: date.day() as u8,
        }
    }

    pub fn month(&self) -> u32 {
        self.month as u32
    }

    pub fn day(&self) -> u32 {
        self.day as u32
    }

    /// Containment in a closed `[start, end]` range that wraps across
    /// the year boundary when `start > end`.
    pub fn within(self, start: MonthDay, end: MonthDay) -> bool {
        if start <= end {
            start <= self && self <= end
        } else {
            self >= start || self <= end
        }
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl FromStr for MonthDay {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 5
            && bytes[2] == b'-'
            && bytes[..2].iter().all(u8::is_ascii_digit)
            && bytes[3..].iter().all(u8::is_ascii_digit);
        if !well_formed {
            return Err(CoreError::validation(format!(
                "invalid month-day '{}', expected MM-DD",
                s
            )));
        }
        let month = s[..2].parse::<u32>().map_err(|e| CoreError::validation(e.to_string()))?;
        let day = s[3..].parse::<u32>().map_err(|e| CoreError::validation(e.to_string()))?;
        MonthDay::new(month, day)
    }
}

impl TryFrom<String> for MonthDay {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthDay> for String {
    fn from(value: MonthDay) -> Self {
        value.to_string()
    }
}
