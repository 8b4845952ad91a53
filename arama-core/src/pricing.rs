use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, CoreResult, MonthDay};

/// A named pricing period bounded by year-less month-days.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Season {
    pub id: Uuid,
    pub name: String,
    pub start: MonthDay,
    pub end: MonthDay,
    pub nightly_rate: Decimal,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Season {
    /// True when `date` falls inside this season's range, wrapping over
    /// New Year when `start > end`.
    pub fn covers(&self, date: NaiveDate) -> bool {
        MonthDay::of(date).within(self.start, self.end)
    }

    pub fn wraps_year(&self) -> bool {
        self.start > self.end
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSeason {
    pub name: String,
    pub start: MonthDay,
    pub end: MonthDay,
    pub nightly_rate: Decimal,
    #[serde(default)]
    pub is_default: bool,
}

impl NewSeason {
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("Season name is required"));
        }
        if self.nightly_rate.is_sign_negative() {
            return Err(CoreError::validation("Nightly rate must not be negative"));
        }
        Ok(())
    }
}

/// Guest-capacity tier adding a flat surcharge to every night.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BedroomTier {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub surcharge: Decimal,
    pub max_guests: i32,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBedroomTier {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "price_add")]
    pub surcharge: Decimal,
    #[serde(default = "default_max_guests")]
    pub max_guests: i32,
    #[serde(default)]
    pub is_default: bool,
}

fn default_max_guests() -> i32 {
    2
}

impl NewBedroomTier {
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("Tier name is required"));
        }
        if self.surcharge.is_sign_negative() {
            return Err(CoreError::validation("Surcharge must not be negative"));
        }
        if self.max_guests < 1 {
            return Err(CoreError::validation("Max guests must be at least 1"));
        }
        Ok(())
    }
}

/// Price of a single night.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NightlyQuote {
    pub property_id: Uuid,
    pub date: NaiveDate,
    pub season_name: String,
    pub season_rate: Decimal,
    pub tier_id: Option<Uuid>,
    pub tier_name: String,
    pub tier_surcharge: Decimal,
    pub total: Decimal,
}

/// Price of a whole stay; `breakdown` holds one entry per night.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StayQuote {
    pub property_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: usize,
    pub total: Decimal,
    pub breakdown: Vec<NightlyQuote>,
}
