use arama_core::repository::{BlockedDateRepository, FeedSubscriptionRepository};
use arama_core::{
    BlockedDate, CoreError, CoreResult, FeedSubscription, NewBlockedDate, NewFeedSubscription,
    SyncStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Blocked nights and the feeds that produce them.
pub struct PgCalendarRepository {
    pool: PgPool,
}

impl PgCalendarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BlockedDateRow {
    id: Uuid,
    property_id: Uuid,
    date: NaiveDate,
    source: String,
    event_uid: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<BlockedDateRow> for BlockedDate {
    fn from(row: BlockedDateRow) -> Self {
        BlockedDate {
            id: row.id,
            property_id: row.property_id,
            date: row.date,
            source: row.source,
            event_uid: row.event_uid,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct FeedRow {
    id: Uuid,
    property_id: Uuid,
    url: String,
    source: String,
    last_sync: Option<DateTime<Utc>>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<FeedRow> for FeedSubscription {
    type Error = CoreError;

    fn try_from(row: FeedRow) -> Result<Self, Self::Error> {
        Ok(FeedSubscription {
            id: row.id,
            property_id: row.property_id,
            url: row.url,
            source: row.source,
            last_sync: row.last_sync,
            status: row.status.parse().map_err(CoreError::storage)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const INSERT_BLOCKED: &str = r#"
    INSERT INTO blocked_dates (id, property_id, date, source, event_uid)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (property_id, date) DO NOTHING
"#;

const FEED_COLUMNS: &str =
    "id, property_id, url, source, last_sync, status, created_at, updated_at";

#[async_trait]
impl BlockedDateRepository for PgCalendarRepository {
    async fn list_blocked_dates(&self, property_id: Uuid) -> CoreResult<Vec<BlockedDate>> {
        let rows = sqlx::query_as::<_, BlockedDateRow>(
            "SELECT id, property_id, date, source, event_uid, created_at FROM blocked_dates WHERE property_id = $1 ORDER BY date ASC",
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await
        .map_err(CoreError::storage)?;

        Ok(rows.into_iter().map(BlockedDate::from).collect())
    }

    async fn add_blocked_date(&self, entry: &NewBlockedDate) -> CoreResult<bool> {
        let result = sqlx::query(INSERT_BLOCKED)
            .bind(Uuid::new_v4())
            .bind(entry.property_id)
            .bind(entry.date)
            .bind(&entry.source)
            .bind(&entry.event_uid)
            .execute(&self.pool)
            .await
            .map_err(CoreError::storage)?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_source(&self, property_id: Uuid, source: &str) -> CoreResult<u64> {
        let result = sqlx::query("DELETE FROM blocked_dates WHERE property_id = $1 AND source = $2")
            .bind(property_id)
            .bind(source)
            .execute(&self.pool)
            .await
            .map_err(CoreError::storage)?;
        Ok(result.rows_affected())
    }

    async fn replace_source(
        &self,
        property_id: Uuid,
        source: &str,
        entries: &[NewBlockedDate],
    ) -> CoreResult<u64> {
        let mut tx = self.pool.begin().await.map_err(CoreError::storage)?;

        sqlx::query("DELETE FROM blocked_dates WHERE property_id = $1 AND source = $2")
            .bind(property_id)
            .bind(source)
            .execute(&mut *tx)
            .await
            .map_err(CoreError::storage)?;

        let mut inserted = 0;
        for entry in entries {
            let result = sqlx::query(INSERT_BLOCKED)
                .bind(Uuid::new_v4())
                .bind(entry.property_id)
                .bind(entry.date)
                .bind(&entry.source)
                .bind(&entry.event_uid)
                .execute(&mut *tx)
                .await
                .map_err(CoreError::storage)?;
            inserted += result.rows_affected();
        }

        tx.commit().await.map_err(CoreError::storage)?;
        Ok(inserted)
    }
}

#[async_trait]
impl FeedSubscriptionRepository for PgCalendarRepository {
    async fn list_subscriptions(&self) -> CoreResult<Vec<FeedSubscription>> {
        let rows = sqlx::query_as::<_, FeedRow>(&format!(
            "SELECT {} FROM feed_subscriptions ORDER BY created_at DESC",
            FEED_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(CoreError::storage)?;

        rows.into_iter().map(FeedSubscription::try_from).collect()
    }

    async fn get_subscription(&self, id: Uuid) -> CoreResult<Option<FeedSubscription>> {
        let row = sqlx::query_as::<_, FeedRow>(&format!(
            "SELECT {} FROM feed_subscriptions WHERE id = $1",
            FEED_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(CoreError::storage)?;

        row.map(FeedSubscription::try_from).transpose()
    }

    async fn create_subscription(&self, feed: &NewFeedSubscription) -> CoreResult<FeedSubscription> {
        let row = sqlx::query_as::<_, FeedRow>(&format!(
            r#"
            INSERT INTO feed_subscriptions (id, property_id, url, source, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            FEED_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(feed.property_id)
        .bind(&feed.url)
        .bind(&feed.source)
        .bind(SyncStatus::Active.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(CoreError::storage)?;

        FeedSubscription::try_from(row)
    }

    async fn record_sync(&self, id: Uuid, status: SyncStatus, at: DateTime<Utc>) -> CoreResult<()> {
        sqlx::query(
            "UPDATE feed_subscriptions SET status = $2, last_sync = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(CoreError::storage)?;
        Ok(())
    }

    async fn delete_subscription(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM feed_subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(CoreError::storage)?;
        Ok(result.rows_affected() > 0)
    }
}
