use arama_core::{BedroomTier, CoreError, MonthDay, NewBedroomTier, NewSeason, Season};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{ApiResult, AppError};
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeasonRequest {
    pub name: String,
    #[serde(alias = "start_date")]
    pub start: String,
    #[serde(alias = "end_date")]
    pub end: String,
    #[serde(alias = "daily_price")]
    pub nightly_rate: Decimal,
    pub is_default: bool,
}

impl SeasonRequest {
    fn into_new_season(self) -> Result<NewSeason, CoreError> {
        if self.name.trim().is_empty() || self.start.trim().is_empty() || self.end.trim().is_empty() {
            return Err(CoreError::validation(
                "Name, start_date, and end_date are required",
            ));
        }
        let season = NewSeason {
            name: self.name.trim().to_string(),
            start: parse_month_day("start_date", &self.start)?,
            end: parse_month_day("end_date", &self.end)?,
            nightly_rate: self.nightly_rate,
            is_default: self.is_default,
        };
        season.validate()?;
        Ok(season)
    }
}

fn parse_month_day(field: &str, raw: &str) -> Result<MonthDay, CoreError> {
    raw.trim().parse().map_err(|_| {
        CoreError::validation(format!("Invalid {} '{}'. Expected MM-DD", field, raw))
    })
}

// ============================================================================
// Season Handlers
// ============================================================================

/// GET /api/admin/seasons
pub async fn list_seasons(State(state): State<AppState>) -> ApiResult<Json<Vec<Season>>> {
    Ok(Json(state.repos.seasons.list_seasons().await?))
}

/// POST /api/admin/seasons
pub async fn create_season(
    State(state): State<AppState>,
    payload: Result<Json<SeasonRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;
    let season = state
        .repos
        .seasons
        .create_season(&req.into_new_season()?)
        .await?;
    tracing::info!("Created season {} ({})", season.name, season.id);
    Ok((StatusCode::CREATED, Json(season)))
}

/// PUT /api/admin/seasons/{id}
pub async fn update_season(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<SeasonRequest>, JsonRejection>,
) -> ApiResult<Json<Season>> {
    let Json(req) = payload?;
    state
        .repos
        .seasons
        .update_season(id, &req.into_new_season()?)
        .await?
        .map(Json)
        .ok_or_else(|| CoreError::not_found("Season").into())
}

/// DELETE /api/admin/seasons/{id}
pub async fn delete_season(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    if !state.repos.seasons.delete_season(id).await? {
        return Err(AppError::NotFoundError("Season not found".to_string()));
    }
    Ok(Json(json!({ "message": "Season deleted successfully" })))
}

// ============================================================================
// Bedroom Tier Handlers
// ============================================================================

/// GET /api/admin/bedroom-configs
pub async fn list_tiers(State(state): State<AppState>) -> ApiResult<Json<Vec<BedroomTier>>> {
    Ok(Json(state.repos.tiers.list_tiers().await?))
}

/// POST /api/admin/bedroom-configs
pub async fn create_tier(
    State(state): State<AppState>,
    payload: Result<Json<NewBedroomTier>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(mut req) = payload?;
    req.name = req.name.trim().to_string();
    req.validate()?;
    let tier = state.repos.tiers.create_tier(&req).await?;
    tracing::info!("Created bedroom tier {} ({})", tier.name, tier.id);
    Ok((StatusCode::CREATED, Json(tier)))
}

/// PUT /api/admin/bedroom-configs/{id}
pub async fn update_tier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<NewBedroomTier>, JsonRejection>,
) -> ApiResult<Json<BedroomTier>> {
    let Json(mut req) = payload?;
    req.name = req.name.trim().to_string();
    req.validate()?;
    state
        .repos
        .tiers
        .update_tier(id, &req)
        .await?
        .map(Json)
        .ok_or_else(|| CoreError::not_found("Bedroom config").into())
}

/// DELETE /api/admin/bedroom-configs/{id}
pub async fn delete_tier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    if !state.repos.tiers.delete_tier(id).await? {
        return Err(AppError::NotFoundError("Bedroom config not found".to_string()));
    }
    Ok(Json(json!({ "message": "Bedroom config deleted successfully" })))
}
