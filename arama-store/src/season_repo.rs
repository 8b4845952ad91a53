use arama_core::repository::{BedroomTierRepository, SeasonRepository};
use arama_core::{BedroomTier, CoreError, CoreResult, NewBedroomTier, NewSeason, Season};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// Seasons and bedroom tiers: the two rate tables with a single-default rule.
///
/// The rule is held by the partial unique index on `is_default`; a write
/// that would add a second default fails atomically and surfaces as a
/// validation error.
pub struct PgRateRepository {
    pool: PgPool,
}

impl PgRateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SeasonRow {
    id: Uuid,
    name: String,
    start_date: String,
    end_date: String,
    nightly_rate: Decimal,
    is_default: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SeasonRow> for Season {
    type Error = CoreError;

    fn try_from(row: SeasonRow) -> Result<Self, Self::Error> {
        Ok(Season {
            id: row.id,
            name: row.name,
            start: row.start_date.trim().parse().map_err(CoreError::storage)?,
            end: row.end_date.trim().parse().map_err(CoreError::storage)?,
            nightly_rate: row.nightly_rate,
            is_default: row.is_default,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TierRow {
    id: Uuid,
    name: String,
    description: String,
    surcharge: Decimal,
    max_guests: i32,
    is_default: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TierRow> for BedroomTier {
    fn from(row: TierRow) -> Self {
        BedroomTier {
            id: row.id,
            name: row.name,
            description: row.description,
            surcharge: row.surcharge,
            max_guests: row.max_guests,
            is_default: row.is_default,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SEASON_COLUMNS: &str =
    "id, name, start_date, end_date, nightly_rate, is_default, created_at, updated_at";
const TIER_COLUMNS: &str =
    "id, name, description, surcharge, max_guests, is_default, created_at, updated_at";

// Only the single-default index can raise a unique violation on these
// tables; ids are fresh v4 uuids.
fn write_error(kind: &'static str) -> impl Fn(sqlx::Error) -> CoreError {
    move |err| {
        let duplicate_default = err
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation());
        if duplicate_default {
            CoreError::duplicate_default(kind)
        } else {
            CoreError::storage(err)
        }
    }
}

#[async_trait]
impl SeasonRepository for PgRateRepository {
    async fn list_seasons(&self) -> CoreResult<Vec<Season>> {
        let rows = sqlx::query_as::<_, SeasonRow>(&format!(
            "SELECT {} FROM seasons ORDER BY is_default DESC, nightly_rate DESC, name ASC",
            SEASON_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(CoreError::storage)?;

        rows.into_iter().map(Season::try_from).collect()
    }

    async fn get_season(&self, id: Uuid) -> CoreResult<Option<Season>> {
        let row = sqlx::query_as::<_, SeasonRow>(&format!(
            "SELECT {} FROM seasons WHERE id = $1",
            SEASON_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(CoreError::storage)?;

        row.map(Season::try_from).transpose()
    }

    async fn create_season(&self, season: &NewSeason) -> CoreResult<Season> {
        let row = sqlx::query_as::<_, SeasonRow>(&format!(
            r#"
            INSERT INTO seasons (id, name, start_date, end_date, nightly_rate, is_default)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            SEASON_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&season.name)
        .bind(season.start.to_string())
        .bind(season.end.to_string())
        .bind(season.nightly_rate)
        .bind(season.is_default)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error("season"))?;

        Season::try_from(row)
    }

    async fn update_season(&self, id: Uuid, season: &NewSeason) -> CoreResult<Option<Season>> {
        let row = sqlx::query_as::<_, SeasonRow>(&format!(
            r#"
            UPDATE seasons
            SET name = $2, start_date = $3, end_date = $4, nightly_rate = $5, is_default = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SEASON_COLUMNS
        ))
        .bind(id)
        .bind(&season.name)
        .bind(season.start.to_string())
        .bind(season.end.to_string())
        .bind(season.nightly_rate)
        .bind(season.is_default)
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error("season"))?;

        row.map(Season::try_from).transpose()
    }

    async fn delete_season(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM seasons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(CoreError::storage)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl BedroomTierRepository for PgRateRepository {
    async fn list_tiers(&self) -> CoreResult<Vec<BedroomTier>> {
        let rows = sqlx::query_as::<_, TierRow>(&format!(
            "SELECT {} FROM bedroom_tiers ORDER BY surcharge ASC, name ASC",
            TIER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(CoreError::storage)?;

        Ok(rows.into_iter().map(BedroomTier::from).collect())
    }

    async fn get_tier(&self, id: Uuid) -> CoreResult<Option<BedroomTier>> {
        let row = sqlx::query_as::<_, TierRow>(&format!(
            "SELECT {} FROM bedroom_tiers WHERE id = $1",
            TIER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(CoreError::storage)?;

        Ok(row.map(BedroomTier::from))
    }

    async fn create_tier(&self, tier: &NewBedroomTier) -> CoreResult<BedroomTier> {
        let row = sqlx::query_as::<_, TierRow>(&format!(
            r#"
            INSERT INTO bedroom_tiers (id, name, description, surcharge, max_guests, is_default)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            TIER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&tier.name)
        .bind(&tier.description)
        .bind(tier.surcharge)
        .bind(tier.max_guests)
        .bind(tier.is_default)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error("bedroom tier"))?;

        Ok(row.into())
    }

    async fn update_tier(&self, id: Uuid, tier: &NewBedroomTier) -> CoreResult<Option<BedroomTier>> {
        let row = sqlx::query_as::<_, TierRow>(&format!(
            r#"
            UPDATE bedroom_tiers
            SET name = $2, description = $3, surcharge = $4, max_guests = $5, is_default = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            TIER_COLUMNS
        ))
        .bind(id)
        .bind(&tier.name)
        .bind(&tier.description)
        .bind(tier.surcharge)
        .bind(tier.max_guests)
        .bind(tier.is_default)
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error("bedroom tier"))?;

        Ok(row.map(BedroomTier::from))
    }

    async fn delete_tier(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM bedroom_tiers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(CoreError::storage)?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_constraint_errors_stay_storage_errors() {
        let err = write_error("season")(sqlx::Error::RowNotFound);
        assert!(matches!(err, CoreError::StorageError(_)));
    }

    #[test]
    fn test_duplicate_default_message_names_the_table() {
        match CoreError::duplicate_default("bedroom tier") {
            CoreError::ValidationError(msg) => {
                assert!(msg.starts_with("Another bedroom tier is already the default"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
