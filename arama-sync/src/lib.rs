//! Calendar-feed synchronization: fetch a subscribed iCal feed, expand its
//! events into blocked nights and reconcile them per source.

pub mod dispatcher;
pub mod fetch;
pub mod ical;
pub mod synchronizer;

pub use dispatcher::SyncDispatcher;
pub use fetch::{FeedFetcher, FetchError, HttpFeedFetcher};
pub use ical::{parse_feed, FeedEvent, ParsedFeed};
pub use synchronizer::{FeedSynchronizer, SyncOutcome};

use arama_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Feed fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Storage(#[from] CoreError),
}
