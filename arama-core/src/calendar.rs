use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

/// A night that an external calendar has claimed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockedDate {
    pub id: Uuid,
    pub property_id: Uuid,
    pub date: NaiveDate,
    pub source: String,
    pub event_uid: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBlockedDate {
    pub property_id: Uuid,
    pub date: NaiveDate,
    pub source: String,
    pub event_uid: Option<String>,
}

/// Outcome of the most recent sync attempt of a feed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Active,
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Active => "active",
            SyncStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SyncStatus::Active),
            "failed" => Ok(SyncStatus::Failed),
            other => Err(CoreError::validation(format!("unknown sync status '{}'", other))),
        }
    }
}

/// An external iCal feed whose events block nights of a property.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedSubscription {
    pub id: Uuid,
    pub property_id: Uuid,
    pub url: String,
    pub source: String,
    pub last_sync: Option<DateTime<Utc>>,
    pub status: SyncStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFeedSubscription {
    pub property_id: Uuid,
    pub url: String,
    pub source: String,
}
