use std::sync::Arc;

use arama_core::repository::{
    BedroomTierRepository, BlockedDateRepository, EnquiryRepository, FeedSubscriptionRepository,
    PropertyRepository, SeasonRepository,
};
use sqlx::PgPool;

pub mod app_config;
pub mod database;
pub mod memory;
pub mod seed;

mod calendar_repo;
mod enquiry_repo;
mod property_repo;
mod season_repo;

pub use calendar_repo::PgCalendarRepository;
pub use database::DbClient;
pub use enquiry_repo::PgEnquiryRepository;
pub use memory::MemoryStore;
pub use property_repo::PgPropertyRepository;
pub use season_repo::PgRateRepository;
pub use seed::seed_defaults;

/// Storage handles threaded through the services.
#[derive(Clone)]
pub struct Repositories {
    pub properties: Arc<dyn PropertyRepository>,
    pub seasons: Arc<dyn SeasonRepository>,
    pub tiers: Arc<dyn BedroomTierRepository>,
    pub blocked_dates: Arc<dyn BlockedDateRepository>,
    pub feeds: Arc<dyn FeedSubscriptionRepository>,
    pub enquiries: Arc<dyn EnquiryRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        let rates = Arc::new(PgRateRepository::new(pool.clone()));
        let calendar = Arc::new(PgCalendarRepository::new(pool.clone()));
        Self {
            properties: Arc::new(PgPropertyRepository::new(pool.clone())),
            seasons: rates.clone(),
            tiers: rates,
            blocked_dates: calendar.clone(),
            feeds: calendar,
            enquiries: Arc::new(PgEnquiryRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self::from_memory(Arc::new(MemoryStore::new()))
    }

    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            properties: store.clone(),
            seasons: store.clone(),
            tiers: store.clone(),
            blocked_dates: store.clone(),
            feeds: store.clone(),
            enquiries: store,
        }
    }
}
