pub mod month_day;
pub mod dates;
pub mod pricing;
pub mod calendar;
pub mod enquiry;
pub mod property;
pub mod repository;

pub use month_day::MonthDay;
pub use pricing::{BedroomTier, NewBedroomTier, NewSeason, NightlyQuote, Season, StayQuote};
pub use calendar::{BlockedDate, FeedSubscription, NewBlockedDate, NewFeedSubscription, SyncStatus};
pub use enquiry::{Enquiry, EnquiryStatus, NewEnquiry};
pub use property::{NewProperty, Property};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl CoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        CoreError::NotFound(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::ValidationError(msg.into())
    }

    /// A write that would leave two defaults in a rate table.
    pub fn duplicate_default(kind: &str) -> Self {
        CoreError::ValidationError(format!(
            "Another {} is already the default; clear its default flag first",
            kind
        ))
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        CoreError::StorageError(err.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
