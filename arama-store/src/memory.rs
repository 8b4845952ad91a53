use std::cmp::Reverse;

use arama_core::repository::{
    BedroomTierRepository, BlockedDateRepository, EnquiryRepository, FeedSubscriptionRepository,
    PropertyRepository, SeasonRepository,
};
use arama_core::{
    BedroomTier, BlockedDate, CoreError, CoreResult, Enquiry, EnquiryStatus, FeedSubscription,
    NewBedroomTier, NewBlockedDate, NewEnquiry, NewFeedSubscription, NewProperty, NewSeason,
    Property, Season, SyncStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct State {
    properties: Vec<Property>,
    seasons: Vec<Season>,
    tiers: Vec<BedroomTier>,
    blocked: Vec<BlockedDate>,
    feeds: Vec<FeedSubscription>,
    enquiries: Vec<Enquiry>,
}

impl State {
    fn insert_blocked(&mut self, entry: &NewBlockedDate) -> bool {
        let taken = self
            .blocked
            .iter()
            .any(|b| b.property_id == entry.property_id && b.date == entry.date);
        if taken {
            return false;
        }
        self.blocked.push(BlockedDate {
            id: Uuid::new_v4(),
            property_id: entry.property_id,
            date: entry.date,
            source: entry.source.clone(),
            event_uid: entry.event_uid.clone(),
            created_at: Utc::now(),
        });
        true
    }

    fn remove_source(&mut self, property_id: Uuid, source: &str) -> u64 {
        let before = self.blocked.len();
        self.blocked
            .retain(|b| !(b.property_id == property_id && b.source == source));
        (before - self.blocked.len()) as u64
    }
}

/// Every repository trait over one lock-guarded state. Each call holds the
/// lock for its whole unit of work, which gives the same atomicity the
/// Postgres transactions give.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PropertyRepository for MemoryStore {
    async fn list_properties(&self) -> CoreResult<Vec<Property>> {
        Ok(self.state.read().await.properties.clone())
    }

    async fn get_property(&self, id: Uuid) -> CoreResult<Option<Property>> {
        let state = self.state.read().await;
        Ok(state.properties.iter().find(|p| p.id == id).cloned())
    }

    async fn create_property(&self, property: &NewProperty) -> CoreResult<Property> {
        let now = Utc::now();
        let created = Property {
            id: Uuid::new_v4(),
            name: property.name.clone(),
            tagline: property.tagline.clone(),
            description: property.description.clone(),
            location: property.location.clone(),
            image_url: property.image_url.clone(),
            images: property.images.clone(),
            amenities: property.amenities.clone(),
            max_guests: property.max_guests,
            bedrooms: property.bedrooms,
            bathrooms: property.bathrooms,
            created_at: now,
            updated_at: now,
        };
        self.state.write().await.properties.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl SeasonRepository for MemoryStore {
    async fn list_seasons(&self) -> CoreResult<Vec<Season>> {
        let mut seasons = self.state.read().await.seasons.clone();
        seasons.sort_by(|a, b| {
            b.is_default
                .cmp(&a.is_default)
                .then_with(|| b.nightly_rate.cmp(&a.nightly_rate))
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(seasons)
    }

    async fn get_season(&self, id: Uuid) -> CoreResult<Option<Season>> {
        let state = self.state.read().await;
        Ok(state.seasons.iter().find(|s| s.id == id).cloned())
    }

    async fn create_season(&self, season: &NewSeason) -> CoreResult<Season> {
        let now = Utc::now();
        let created = Season {
            id: Uuid::new_v4(),
            name: season.name.clone(),
            start: season.start,
            end: season.end,
            nightly_rate: season.nightly_rate,
            is_default: season.is_default,
            created_at: now,
            updated_at: now,
        };

        let mut state = self.state.write().await;
        if created.is_default && state.seasons.iter().any(|s| s.is_default) {
            return Err(CoreError::duplicate_default("season"));
        }
        state.seasons.push(created.clone());
        Ok(created)
    }

    async fn update_season(&self, id: Uuid, season: &NewSeason) -> CoreResult<Option<Season>> {
        let now = Utc::now();
        let mut state = self.state.write().await;
        if season.is_default && state.seasons.iter().any(|s| s.is_default && s.id != id) {
            if !state.seasons.iter().any(|s| s.id == id) {
                return Ok(None);
            }
            return Err(CoreError::duplicate_default("season"));
        }

        let Some(existing) = state.seasons.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        existing.name = season.name.clone();
        existing.start = season.start;
        existing.end = season.end;
        existing.nightly_rate = season.nightly_rate;
        existing.is_default = season.is_default;
        existing.updated_at = now;
        Ok(Some(existing.clone()))
    }

    async fn delete_season(&self, id: Uuid) -> CoreResult<bool> {
        let mut state = self.state.write().await;
        let before = state.seasons.len();
        state.seasons.retain(|s| s.id != id);
        Ok(state.seasons.len() < before)
    }
}

#[async_trait]
impl BedroomTierRepository for MemoryStore {
    async fn list_tiers(&self) -> CoreResult<Vec<BedroomTier>> {
        let mut tiers = self.state.read().await.tiers.clone();
        tiers.sort_by(|a, b| a.surcharge.cmp(&b.surcharge).then_with(|| a.name.cmp(&b.name)));
        Ok(tiers)
    }

    async fn get_tier(&self, id: Uuid) -> CoreResult<Option<BedroomTier>> {
        let state = self.state.read().await;
        Ok(state.tiers.iter().find(|t| t.id == id).cloned())
    }

    async fn create_tier(&self, tier: &NewBedroomTier) -> CoreResult<BedroomTier> {
        let now = Utc::now();
        let created = BedroomTier {
            id: Uuid::new_v4(),
            name: tier.name.clone(),
            description: tier.description.clone(),
            surcharge: tier.surcharge,
            max_guests: tier.max_guests,
            is_default: tier.is_default,
            created_at: now,
            updated_at: now,
        };

        let mut state = self.state.write().await;
        if created.is_default && state.tiers.iter().any(|t| t.is_default) {
            return Err(CoreError::duplicate_default("bedroom tier"));
        }
        state.tiers.push(created.clone());
        Ok(created)
    }

    async fn update_tier(&self, id: Uuid, tier: &NewBedroomTier) -> CoreResult<Option<BedroomTier>> {
        let now = Utc::now();
        let mut state = self.state.write().await;
        if tier.is_default && state.tiers.iter().any(|t| t.is_default && t.id != id) {
            if !state.tiers.iter().any(|t| t.id == id) {
                return Ok(None);
            }
            return Err(CoreError::duplicate_default("bedroom tier"));
        }

        let Some(existing) = state.tiers.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        existing.name = tier.name.clone();
        existing.description = tier.description.clone();
        existing.surcharge = tier.surcharge;
        existing.max_guests = tier.max_guests;
        existing.is_default = tier.is_default;
        existing.updated_at = now;
        Ok(Some(existing.clone()))
    }

    async fn delete_tier(&self, id: Uuid) -> CoreResult<bool> {
        let mut state = self.state.write().await;
        let before = state.tiers.len();
        state.tiers.retain(|t| t.id != id);
        Ok(state.tiers.len() < before)
    }
}

#[async_trait]
impl BlockedDateRepository for MemoryStore {
    async fn list_blocked_dates(&self, property_id: Uuid) -> CoreResult<Vec<BlockedDate>> {
        let state = self.state.read().await;
        let mut dates: Vec<BlockedDate> = state
            .blocked
            .iter()
            .filter(|b| b.property_id == property_id)
            .cloned()
            .collect();
        dates.sort_by_key(|b| b.date);
        Ok(dates)
    }

    async fn add_blocked_date(&self, entry: &NewBlockedDate) -> CoreResult<bool> {
        Ok(self.state.write().await.insert_blocked(entry))
    }

    async fn clear_source(&self, property_id: Uuid, source: &str) -> CoreResult<u64> {
        Ok(self.state.write().await.remove_source(property_id, source))
    }

    async fn replace_source(
        &self,
        property_id: Uuid,
        source: &str,
        entries: &[NewBlockedDate],
    ) -> CoreResult<u64> {
        let mut state = self.state.write().await;
        state.remove_source(property_id, source);
        let inserted = entries.iter().filter(|e| state.insert_blocked(e)).count();
        Ok(inserted as u64)
    }
}

#[async_trait]
impl FeedSubscriptionRepository for MemoryStore {
    async fn list_subscriptions(&self) -> CoreResult<Vec<FeedSubscription>> {
        let state = self.state.read().await;
        let mut feeds: Vec<(usize, FeedSubscription)> =
            state.feeds.iter().cloned().enumerate().collect();
        feeds.sort_by_key(|(pos, f)| (Reverse(f.created_at), Reverse(*pos)));
        Ok(feeds.into_iter().map(|(_, f)| f).collect())
    }

    async fn get_subscription(&self, id: Uuid) -> CoreResult<Option<FeedSubscription>> {
        let state = self.state.read().await;
        Ok(state.feeds.iter().find(|f| f.id == id).cloned())
    }

    async fn create_subscription(&self, feed: &NewFeedSubscription) -> CoreResult<FeedSubscription> {
        let now = Utc::now();
        let created = FeedSubscription {
            id: Uuid::new_v4(),
            property_id: feed.property_id,
            url: feed.url.clone(),
            source: feed.source.clone(),
            last_sync: None,
            status: SyncStatus::Active,
            created_at: now,
            updated_at: now,
        };
        self.state.write().await.feeds.push(created.clone());
        Ok(created)
    }

    async fn record_sync(&self, id: Uuid, status: SyncStatus, at: DateTime<Utc>) -> CoreResult<()> {
        let mut state = self.state.write().await;
        if let Some(feed) = state.feeds.iter_mut().find(|f| f.id == id) {
            feed.status = status;
            feed.last_sync = Some(at);
            feed.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_subscription(&self, id: Uuid) -> CoreResult<bool> {
        let mut state = self.state.write().await;
        let before = state.feeds.len();
        state.feeds.retain(|f| f.id != id);
        Ok(state.feeds.len() < before)
    }
}

#[async_trait]
impl EnquiryRepository for MemoryStore {
    async fn list_enquiries(&self) -> CoreResult<Vec<Enquiry>> {
        let state = self.state.read().await;
        let mut enquiries: Vec<(usize, Enquiry)> =
            state.enquiries.iter().cloned().enumerate().collect();
        enquiries.sort_by_key(|(pos, e)| (Reverse(e.created_at), Reverse(*pos)));
        Ok(enquiries.into_iter().map(|(_, e)| e).collect())
    }

    async fn get_enquiry(&self, id: Uuid) -> CoreResult<Option<Enquiry>> {
        let state = self.state.read().await;
        Ok(state.enquiries.iter().find(|e| e.id == id).cloned())
    }

    async fn create_enquiry(&self, enquiry: &NewEnquiry) -> CoreResult<Enquiry> {
        let now = Utc::now();
        let created = Enquiry {
            id: Uuid::new_v4(),
            property_id: enquiry.property_id,
            name: enquiry.name.clone(),
            email: enquiry.email.clone(),
            phone: enquiry.phone.clone(),
            check_in: enquiry.check_in,
            check_out: enquiry.check_out,
            guests: enquiry.guests,
            tier_id: enquiry.tier_id,
            message: enquiry.message.clone(),
            total_price: enquiry.total_price,
            status: EnquiryStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.state.write().await.enquiries.push(created.clone());
        Ok(created)
    }

    async fn update_enquiry_status(
        &self,
        id: Uuid,
        status: EnquiryStatus,
    ) -> CoreResult<Option<Enquiry>> {
        let mut state = self.state.write().await;
        Ok(state.enquiries.iter_mut().find(|e| e.id == id).map(|e| {
            e.status = status;
            e.updated_at = Utc::now();
            e.clone()
        }))
    }
}
