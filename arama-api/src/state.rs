use std::sync::Arc;

use arama_catalog::{PricingConfig, PricingEngine};
use arama_store::Repositories;
use arama_sync::{FeedFetcher, FeedSynchronizer, SyncDispatcher};

use crate::notifier::{NotificationQueue, Notifier};

const NOTIFICATION_QUEUE_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub pricing: Arc<PricingEngine>,
    pub sync: Arc<SyncDispatcher>,
    pub notifications: NotificationQueue,
}

impl AppState {
    /// Wires the services over `repos`. Spawns the notification worker, so
    /// it must run inside a tokio runtime.
    pub fn new(
        repos: Repositories,
        fetcher: Arc<dyn FeedFetcher>,
        notifier: Arc<dyn Notifier>,
        pricing: PricingConfig,
        max_concurrent_syncs: usize,
    ) -> Self {
        let engine = PricingEngine::new(repos.seasons.clone(), repos.tiers.clone(), pricing);
        let synchronizer = Arc::new(FeedSynchronizer::new(
            fetcher,
            repos.blocked_dates.clone(),
            repos.feeds.clone(),
        ));
        let sync = SyncDispatcher::new(synchronizer, repos.feeds.clone(), max_concurrent_syncs);
        let (notifications, _worker) = NotificationQueue::start(notifier, NOTIFICATION_QUEUE_CAPACITY);

        Self {
            repos,
            pricing: Arc::new(engine),
            sync: Arc::new(sync),
            notifications,
        }
    }
}
