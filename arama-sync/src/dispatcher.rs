use std::sync::Arc;
use std::time::Duration;

use arama_core::repository::FeedSubscriptionRepository;
use arama_core::{CoreResult, FeedSubscription};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::synchronizer::{FeedSynchronizer, SyncOutcome};

/// Fire-and-forget front of the synchronizer. Every dispatched pass runs
/// on its own task; at most `max_concurrent` passes fetch at once.
pub struct SyncDispatcher {
    synchronizer: Arc<FeedSynchronizer>,
    feeds: Arc<dyn FeedSubscriptionRepository>,
    permits: Arc<Semaphore>,
}

impl SyncDispatcher {
    pub fn new(
        synchronizer: Arc<FeedSynchronizer>,
        feeds: Arc<dyn FeedSubscriptionRepository>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            synchronizer,
            feeds,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Starts a detached sync pass. The handle is only useful to tests;
    /// callers normally drop it.
    pub fn dispatch(&self, feed: FeedSubscription) -> JoinHandle<()> {
        let synchronizer = self.synchronizer.clone();
        let permits = self.permits.clone();

        tokio::spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            match synchronizer.sync(&feed).await {
                Ok(SyncOutcome::Synced { .. }) => {}
                Ok(SyncOutcome::Failed { reason }) => {
                    info!("Feed {} marked failed: {}", feed.id, reason);
                }
                Err(e) => error!("Sync of feed {} aborted: {}", feed.id, e),
            }
        })
    }

    /// Dispatches every subscription and returns how many were started.
    pub async fn dispatch_all(&self) -> CoreResult<usize> {
        let feeds = self.feeds.list_subscriptions().await?;
        let count = feeds.len();
        for feed in feeds {
            self.dispatch(feed);
        }
        info!("Dispatched {} feed syncs", count);
        Ok(count)
    }

    /// Runs `dispatch_all` every `every`, starting one period from now.
    pub fn spawn_schedule(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = self.dispatch_all().await {
                    error!("Scheduled sync could not list feeds: {}", e);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FeedFetcher, FetchError};
    use arama_core::repository::BlockedDateRepository;
    use arama_core::{NewFeedSubscription, SyncStatus};
    use arama_store::MemoryStore;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    /// Every URL serves the same one-night feed; counts peak concurrency.
    #[derive(Default)]
    struct SlowFetcher {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl FeedFetcher for SlowFetcher {
        async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            if url.contains("broken") {
                return Err(FetchError::Transport("connection refused".to_string()));
            }
            Ok(Bytes::from_static(
                b"BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nUID:x\r\nDTSTART:20240601\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n",
            ))
        }
    }

    #[tokio::test]
    async fn test_dispatch_all_counts_and_bounds_concurrency() {
        let store = Arc::new(MemoryStore::new());
        let fetcher = Arc::new(SlowFetcher::default());
        let synchronizer = Arc::new(FeedSynchronizer::new(
            fetcher.clone(),
            store.clone(),
            store.clone(),
        ));
        let dispatcher = SyncDispatcher::new(synchronizer, store.clone(), 2);

        let mut properties = Vec::new();
        for i in 0..6 {
            let property_id = Uuid::new_v4();
            properties.push(property_id);
            let url = if i == 0 { "https://broken.test/x.ics" } else { "https://ok.test/x.ics" };
            store
                .create_subscription(&NewFeedSubscription {
                    property_id,
                    url: url.to_string(),
                    source: "airbnb".to_string(),
                })
                .await
                .unwrap();
        }

        let count = dispatcher.dispatch_all().await.unwrap();
        assert_eq!(count, 6);

        // Poll persisted state until every pass has stamped its feed.
        for _ in 0..200 {
            let feeds = store.list_subscriptions().await.unwrap();
            if feeds.iter().all(|f| f.last_sync.is_some()) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let feeds = store.list_subscriptions().await.unwrap();
        assert_eq!(feeds.iter().filter(|f| f.status == SyncStatus::Failed).count(), 1);
        assert_eq!(feeds.iter().filter(|f| f.status == SyncStatus::Active).count(), 5);
        assert!(fetcher.peak.load(Ordering::SeqCst) <= 2);

        let blocked = store.list_blocked_dates(properties[1]).await.unwrap();
        assert_eq!(blocked.len(), 1);
        assert!(store.list_blocked_dates(properties[0]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_with_no_feeds() {
        let store = Arc::new(MemoryStore::new());
        let synchronizer = Arc::new(FeedSynchronizer::new(
            Arc::new(SlowFetcher::default()),
            store.clone(),
            store.clone(),
        ));
        let dispatcher = SyncDispatcher::new(synchronizer, store, 4);
        assert_eq!(dispatcher.dispatch_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_schedule_syncs_after_first_period() {
        let store = Arc::new(MemoryStore::new());
        let synchronizer = Arc::new(FeedSynchronizer::new(
            Arc::new(SlowFetcher::default()),
            store.clone(),
            store.clone(),
        ));
        let dispatcher = Arc::new(SyncDispatcher::new(synchronizer, store.clone(), 4));
        store
            .create_subscription(&NewFeedSubscription {
                property_id: Uuid::new_v4(),
                url: "https://ok.test/x.ics".to_string(),
                source: "vrbo".to_string(),
            })
            .await
            .unwrap();

        let schedule = dispatcher.spawn_schedule(Duration::from_millis(50));
        assert!(store.list_subscriptions().await.unwrap()[0].last_sync.is_none());

        for _ in 0..200 {
            if store.list_subscriptions().await.unwrap()[0].last_sync.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        schedule.abort();

        let feed = &store.list_subscriptions().await.unwrap()[0];
        assert_eq!(feed.status, SyncStatus::Active);
        assert!(feed.last_sync.is_some());
    }
}
