use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    BedroomTier, BlockedDate, CoreResult, Enquiry, EnquiryStatus, FeedSubscription, NewBedroomTier,
    NewBlockedDate, NewEnquiry, NewFeedSubscription, NewProperty, NewSeason, Property, Season,
    SyncStatus,
};

/// Repository trait for property metadata
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn list_properties(&self) -> CoreResult<Vec<Property>>;

    async fn get_property(&self, id: Uuid) -> CoreResult<Option<Property>>;

    async fn create_property(&self, property: &NewProperty) -> CoreResult<Property>;
}

/// Repository trait for the season table.
///
/// At most one season is the default. A create or update that would flag a
/// second one fails with `CoreError::ValidationError` and changes nothing.
#[async_trait]
pub trait SeasonRepository: Send + Sync {
    /// Defaults first, then by nightly rate descending.
    async fn list_seasons(&self) -> CoreResult<Vec<Season>>;

    async fn get_season(&self, id: Uuid) -> CoreResult<Option<Season>>;

    async fn create_season(&self, season: &NewSeason) -> CoreResult<Season>;

    async fn update_season(&self, id: Uuid, season: &NewSeason) -> CoreResult<Option<Season>>;

    /// Returns false when nothing was deleted.
    async fn delete_season(&self, id: Uuid) -> CoreResult<bool>;
}

/// Repository trait for bedroom tiers. Same single-default rule as seasons.
#[async_trait]
pub trait BedroomTierRepository: Send + Sync {
    /// Ordered by surcharge ascending.
    async fn list_tiers(&self) -> CoreResult<Vec<BedroomTier>>;

    async fn get_tier(&self, id: Uuid) -> CoreResult<Option<BedroomTier>>;

    async fn create_tier(&self, tier: &NewBedroomTier) -> CoreResult<BedroomTier>;

    async fn update_tier(&self, id: Uuid, tier: &NewBedroomTier) -> CoreResult<Option<BedroomTier>>;

    async fn delete_tier(&self, id: Uuid) -> CoreResult<bool>;
}

/// Repository trait for externally blocked nights
#[async_trait]
pub trait BlockedDateRepository: Send + Sync {
    /// Ordered by date ascending.
    async fn list_blocked_dates(&self, property_id: Uuid) -> CoreResult<Vec<BlockedDate>>;

    /// Idempotent on (property, date): returns false when the night was
    /// already blocked, by any source.
    async fn add_blocked_date(&self, entry: &NewBlockedDate) -> CoreResult<bool>;

    /// Deletes every entry of (property, source), returning how many went.
    async fn clear_source(&self, property_id: Uuid, source: &str) -> CoreResult<u64>;

    /// Clears (property, source) and then inserts `entries` idempotently,
    /// as one unit of work. Returns the number of rows inserted.
    async fn replace_source(
        &self,
        property_id: Uuid,
        source: &str,
        entries: &[NewBlockedDate],
    ) -> CoreResult<u64>;
}

/// Repository trait for iCal feed subscriptions
#[async_trait]
pub trait FeedSubscriptionRepository: Send + Sync {
    /// Newest first.
    async fn list_subscriptions(&self) -> CoreResult<Vec<FeedSubscription>>;

    async fn get_subscription(&self, id: Uuid) -> CoreResult<Option<FeedSubscription>>;

    async fn create_subscription(&self, feed: &NewFeedSubscription) -> CoreResult<FeedSubscription>;

    /// Stamps the outcome of a sync attempt.
    async fn record_sync(&self, id: Uuid, status: SyncStatus, at: DateTime<Utc>) -> CoreResult<()>;

    async fn delete_subscription(&self, id: Uuid) -> CoreResult<bool>;
}

/// Repository trait for booking enquiries
#[async_trait]
pub trait EnquiryRepository: Send + Sync {
    /// Newest first.
    async fn list_enquiries(&self) -> CoreResult<Vec<Enquiry>>;

    async fn get_enquiry(&self, id: Uuid) -> CoreResult<Option<Enquiry>>;

    /// Persists with status `pending`.
    async fn create_enquiry(&self, enquiry: &NewEnquiry) -> CoreResult<Enquiry>;

    async fn update_enquiry_status(
        &self,
        id: Uuid,
        status: EnquiryStatus,
    ) -> CoreResult<Option<Enquiry>>;
}
