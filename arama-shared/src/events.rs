use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Masked;

/// Raised once an enquiry is stored; consumed by the admin notifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnquiryNotification {
    pub enquiry_id: Uuid,
    pub property_id: Uuid,
    pub name: String,
    pub email: Masked<String>,
    pub phone: Masked<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub tier_name: Option<String>,
    pub total_price: Decimal,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
