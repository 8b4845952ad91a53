use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

/// Enquiry status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EnquiryStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl EnquiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnquiryStatus::Pending => "pending",
            EnquiryStatus::Confirmed => "confirmed",
            EnquiryStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for EnquiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnquiryStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EnquiryStatus::Pending),
            "confirmed" => Ok(EnquiryStatus::Confirmed),
            "cancelled" => Ok(EnquiryStatus::Cancelled),
            _ => Err(CoreError::validation(
                "Invalid status. Must be pending, confirmed, or cancelled",
            )),
        }
    }
}

/// A customer's request for a stay. It never reserves the dates; the
/// total is the quote captured at submission and is not recomputed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Enquiry {
    pub id: Uuid,
    pub property_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub tier_id: Option<Uuid>,
    pub message: String,
    pub total_price: Decimal,
    pub status: EnquiryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEnquiry {
    pub property_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub tier_id: Option<Uuid>,
    pub message: String,
    pub total_price: Decimal,
}
