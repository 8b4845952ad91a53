use std::sync::Arc;

use arama_core::repository::{BlockedDateRepository, FeedSubscriptionRepository};
use arama_core::{FeedSubscription, NewBlockedDate, SyncStatus};
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::fetch::FeedFetcher;
use crate::ical::parse_feed;
use crate::SyncError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Feed fetched and the source's nights replaced.
    Synced {
        events: usize,
        skipped: usize,
        blocked: u64,
    },
    /// Fetch failed; the source's nights were left as they were.
    Failed { reason: String },
}

/// Runs one sync pass per subscription.
///
/// Passes for the same (property, source) are serialized so one pass's
/// clear can never interleave with another pass's inserts.
pub struct FeedSynchronizer {
    fetcher: Arc<dyn FeedFetcher>,
    blocked_dates: Arc<dyn BlockedDateRepository>,
    feeds: Arc<dyn FeedSubscriptionRepository>,
    locks: DashMap<(Uuid, String), Arc<Mutex<()>>>,
}

impl FeedSynchronizer {
    pub fn new(
        fetcher: Arc<dyn FeedFetcher>,
        blocked_dates: Arc<dyn BlockedDateRepository>,
        feeds: Arc<dyn FeedSubscriptionRepository>,
    ) -> Self {
        Self {
            fetcher,
            blocked_dates,
            feeds,
            locks: DashMap::new(),
        }
    }

    pub async fn sync(&self, feed: &FeedSubscription) -> Result<SyncOutcome, SyncError> {
        let key = (feed.property_id, feed.source.clone());
        let lock = self.locks.entry(key.clone()).or_default().clone();
        let outcome = {
            let _guard = lock.lock().await;
            self.run_pass(feed).await
        };

        // The map's copy plus ours: no other pass holds or waits on it.
        self.locks
            .remove_if(&key, |_, held| Arc::strong_count(held) == 2);
        outcome
    }

    async fn run_pass(&self, feed: &FeedSubscription) -> Result<SyncOutcome, SyncError> {
        let body = match self.fetcher.fetch(&feed.url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Sync of feed {} ({}) failed: {}", feed.id, feed.source, e);
                self.feeds
                    .record_sync(feed.id, SyncStatus::Failed, Utc::now())
                    .await?;
                return Ok(SyncOutcome::Failed {
                    reason: e.to_string(),
                });
            }
        };

        let parsed = parse_feed(&String::from_utf8_lossy(&body));
        let entries: Vec<NewBlockedDate> = parsed
            .events
            .iter()
            .flat_map(|event| {
                event.blocked_dates().map(move |date| NewBlockedDate {
                    property_id: feed.property_id,
                    date,
                    source: feed.source.clone(),
                    event_uid: event.uid.clone(),
                })
            })
            .collect();

        if parsed.events.is_empty() {
            warn!(
                "Feed {} ({}) has no readable events; clearing its blocked dates",
                feed.id, feed.source
            );
        }

        let blocked = match self
            .blocked_dates
            .replace_source(feed.property_id, &feed.source, &entries)
            .await
        {
            Ok(blocked) => blocked,
            Err(e) => {
                if let Err(mark) = self
                    .feeds
                    .record_sync(feed.id, SyncStatus::Failed, Utc::now())
                    .await
                {
                    warn!("Could not mark feed {} failed: {}", feed.id, mark);
                }
                return Err(e.into());
            }
        };

        self.feeds
            .record_sync(feed.id, SyncStatus::Active, Utc::now())
            .await?;

        info!(
            "Synced feed {} ({}): {} events, {} skipped, {} nights blocked",
            feed.id,
            feed.source,
            parsed.events.len(),
            parsed.skipped,
            blocked
        );

        Ok(SyncOutcome::Synced {
            events: parsed.events.len(),
            skipped: parsed.skipped,
            blocked,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use arama_core::{CoreError, CoreResult, NewFeedSubscription};
    use arama_store::MemoryStore;
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    /// Serves canned bodies keyed by URL; unknown URLs answer 404.
    #[derive(Default)]
    struct StubFetcher {
        bodies: StdMutex<HashMap<String, Result<String, u16>>>,
    }

    impl StubFetcher {
        fn serve(&self, url: &str, response: Result<&str, u16>) {
            self.bodies
                .lock()
                .unwrap()
                .insert(url.to_string(), response.map(str::to_string));
        }
    }

    #[async_trait]
    impl FeedFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
            match self.bodies.lock().unwrap().get(url) {
                Some(Ok(body)) => Ok(Bytes::from(body.clone())),
                Some(Err(status)) => Err(FetchError::Status(*status)),
                None => Err(FetchError::Status(404)),
            }
        }
    }

    /// Blocked-date store whose writes always fail.
    struct BrokenStore;

    #[async_trait]
    impl BlockedDateRepository for BrokenStore {
        async fn list_blocked_dates(&self, _: Uuid) -> CoreResult<Vec<arama_core::BlockedDate>> {
            Ok(Vec::new())
        }
        async fn add_blocked_date(&self, _: &NewBlockedDate) -> CoreResult<bool> {
            Err(CoreError::storage("disk full"))
        }
        async fn clear_source(&self, _: Uuid, _: &str) -> CoreResult<u64> {
            Err(CoreError::storage("disk full"))
        }
        async fn replace_source(&self, _: Uuid, _: &str, _: &[NewBlockedDate]) -> CoreResult<u64> {
            Err(CoreError::storage("disk full"))
        }
    }

    fn event(uid: &str, start: &str, end: &str) -> String {
        format!("BEGIN:VEVENT\r\nUID:{uid}\r\nDTSTART;VALUE=DATE:{start}\r\nDTEND;VALUE=DATE:{end}\r\nEND:VEVENT\r\n")
    }

    fn calendar(events: &[String]) -> String {
        format!("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n{}END:VCALENDAR\r\n", events.concat())
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        fetcher: Arc<StubFetcher>,
        synchronizer: FeedSynchronizer,
        property: Uuid,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let fetcher = Arc::new(StubFetcher::default());
        let synchronizer = FeedSynchronizer::new(fetcher.clone(), store.clone(), store.clone());
        Fixture {
            store,
            fetcher,
            synchronizer,
            property: Uuid::new_v4(),
        }
    }

    async fn subscribe(fx: &Fixture, url: &str, source: &str) -> FeedSubscription {
        fx.store
            .create_subscription(&NewFeedSubscription {
                property_id: fx.property,
                url: url.to_string(),
                source: source.to_string(),
            })
            .await
            .unwrap()
    }

    async fn dates_of(fx: &Fixture, source: &str) -> Vec<NaiveDate> {
        fx.store
            .list_blocked_dates(fx.property)
            .await
            .unwrap()
            .into_iter()
            .filter(|b| b.source == source)
            .map(|b| b.date)
            .collect()
    }

    #[tokio::test]
    async fn test_feed_event_blocks_every_night_inclusive() {
        let fx = fixture();
        fx.fetcher.serve(
            "https://airbnb.test/a.ics",
            Ok(&calendar(&[event("e1", "20240601", "20240603")])),
        );
        let feed = subscribe(&fx, "https://airbnb.test/a.ics", "airbnb").await;

        let outcome = fx.synchronizer.sync(&feed).await.unwrap();
        assert_eq!(
            outcome,
            SyncOutcome::Synced {
                events: 1,
                skipped: 0,
                blocked: 3
            }
        );
        assert_eq!(
            dates_of(&fx, "airbnb").await,
            vec![d("2024-06-01"), d("2024-06-02"), d("2024-06-03")]
        );

        let stored = fx.store.get_subscription(feed.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SyncStatus::Active);
        assert!(stored.last_sync.is_some());
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_dates_untouched() {
        let fx = fixture();
        let url = "https://airbnb.test/a.ics";
        fx.fetcher
            .serve(url, Ok(&calendar(&[event("e1", "20240601", "20240602")])));
        let feed = subscribe(&fx, url, "airbnb").await;
        fx.synchronizer.sync(&feed).await.unwrap();

        fx.fetcher.serve(url, Err(500));
        let outcome = fx.synchronizer.sync(&feed).await.unwrap();
        assert!(matches!(outcome, SyncOutcome::Failed { .. }));

        assert_eq!(
            dates_of(&fx, "airbnb").await,
            vec![d("2024-06-01"), d("2024-06-02")]
        );
        let stored = fx.store.get_subscription(feed.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SyncStatus::Failed);
    }

    #[tokio::test]
    async fn test_resync_replaces_only_its_own_source() {
        let fx = fixture();
        fx.fetcher.serve(
            "https://airbnb.test/a.ics",
            Ok(&calendar(&[event("old", "20240601", "20240602")])),
        );
        fx.fetcher.serve(
            "https://booking.test/b.ics",
            Ok(&calendar(&[event("b1", "20240801", "20240801")])),
        );
        let airbnb = subscribe(&fx, "https://airbnb.test/a.ics", "airbnb").await;
        let booking = subscribe(&fx, "https://booking.test/b.ics", "booking").await;
        fx.synchronizer.sync(&airbnb).await.unwrap();
        fx.synchronizer.sync(&booking).await.unwrap();

        fx.fetcher.serve(
            "https://airbnb.test/a.ics",
            Ok(&calendar(&[event("new", "20240701", "20240702")])),
        );
        fx.synchronizer.sync(&airbnb).await.unwrap();

        assert_eq!(
            dates_of(&fx, "airbnb").await,
            vec![d("2024-07-01"), d("2024-07-02")]
        );
        assert_eq!(dates_of(&fx, "booking").await, vec![d("2024-08-01")]);
    }

    #[tokio::test]
    async fn test_night_claimed_by_another_source_is_not_duplicated() {
        let fx = fixture();
        fx.fetcher.serve(
            "https://booking.test/b.ics",
            Ok(&calendar(&[event("b1", "20240602", "20240602")])),
        );
        fx.fetcher.serve(
            "https://airbnb.test/a.ics",
            Ok(&calendar(&[
                event("a1", "20240601", "20240603"),
                event("a2", "20240603", "20240603"),
            ])),
        );
        let booking = subscribe(&fx, "https://booking.test/b.ics", "booking").await;
        let airbnb = subscribe(&fx, "https://airbnb.test/a.ics", "airbnb").await;
        fx.synchronizer.sync(&booking).await.unwrap();

        let outcome = fx.synchronizer.sync(&airbnb).await.unwrap();
        assert!(matches!(outcome, SyncOutcome::Synced { events: 2, blocked: 2, .. }));

        let all = fx.store.list_blocked_dates(fx.property).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].source, "booking");
    }

    #[tokio::test]
    async fn test_empty_feed_clears_source() {
        let fx = fixture();
        let url = "https://airbnb.test/a.ics";
        fx.fetcher
            .serve(url, Ok(&calendar(&[event("e1", "20240601", "20240605")])));
        let feed = subscribe(&fx, url, "airbnb").await;
        fx.synchronizer.sync(&feed).await.unwrap();

        fx.fetcher.serve(url, Ok(&calendar(&[])));
        fx.synchronizer.sync(&feed).await.unwrap();

        assert!(dates_of(&fx, "airbnb").await.is_empty());
        let stored = fx.store.get_subscription(feed.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SyncStatus::Active);
    }

    #[tokio::test]
    async fn test_storage_fault_marks_failed_and_propagates() {
        let store = Arc::new(MemoryStore::new());
        let fetcher = Arc::new(StubFetcher::default());
        fetcher.serve(
            "https://airbnb.test/a.ics",
            Ok(&calendar(&[event("e1", "20240601", "20240601")])),
        );
        let synchronizer = FeedSynchronizer::new(fetcher, Arc::new(BrokenStore), store.clone());
        let feed = store
            .create_subscription(&NewFeedSubscription {
                property_id: Uuid::new_v4(),
                url: "https://airbnb.test/a.ics".to_string(),
                source: "airbnb".to_string(),
            })
            .await
            .unwrap();

        let result = synchronizer.sync(&feed).await;
        assert!(matches!(result, Err(SyncError::Storage(_))));
        let stored = store.get_subscription(feed.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SyncStatus::Failed);
    }

    #[tokio::test]
    async fn test_concurrent_syncs_of_one_source_never_mix() {
        let fx = Arc::new(fixture());
        let url = "https://airbnb.test/a.ics";
        let events: Vec<String> = (1..=28)
            .map(|day| event(&format!("e{day}"), &format!("202402{day:02}"), &format!("202402{day:02}")))
            .collect();
        fx.fetcher.serve(url, Ok(&calendar(&events)));
        let feed = subscribe(&fx, url, "airbnb").await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let fx = fx.clone();
            let feed = feed.clone();
            handles.push(tokio::spawn(async move {
                fx.synchronizer.sync(&feed).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(dates_of(&fx, "airbnb").await.len(), 28);
        assert!(fx.synchronizer.locks.is_empty());
    }

    #[tokio::test]
    async fn test_lock_entries_are_released_after_each_pass() {
        let fx = fixture();
        fx.fetcher.serve(
            "https://airbnb.test/a.ics",
            Ok(&calendar(&[event("e1", "20240601", "20240601")])),
        );
        fx.fetcher.serve("https://vrbo.test/b.ics", Err(503));
        let airbnb = subscribe(&fx, "https://airbnb.test/a.ics", "airbnb").await;
        let vrbo = subscribe(&fx, "https://vrbo.test/b.ics", "vrbo").await;

        fx.synchronizer.sync(&airbnb).await.unwrap();
        assert!(fx.synchronizer.locks.is_empty());
        fx.synchronizer.sync(&vrbo).await.unwrap();
        assert!(fx.synchronizer.locks.is_empty());

        let held = fx
            .synchronizer
            .locks
            .entry((fx.property, "airbnb".to_string()))
            .or_default()
            .clone();
        fx.synchronizer.sync(&airbnb).await.unwrap();
        assert_eq!(fx.synchronizer.locks.len(), 1);
        drop(held);
    }
}
