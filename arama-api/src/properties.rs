use arama_core::dates::parse_iso_date;
use arama_core::{CoreError, NightlyQuote, Property};
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiResult, AppError};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PricingQuery {
    pub date: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    #[serde(alias = "tier_id")]
    pub bedroom_config_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StayPricingResponse {
    pub property_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: usize,
    pub total_price: Decimal,
    pub breakdown: Vec<NightlyQuote>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub property_id: Uuid,
    pub blocked_dates: Vec<NaiveDate>,
}

/// GET /api/properties
pub async fn list_properties(State(state): State<AppState>) -> ApiResult<Json<Vec<Property>>> {
    Ok(Json(state.repos.properties.list_properties().await?))
}

/// GET /api/properties/{id}
pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Property>> {
    Ok(Json(require_property(&state, id).await?))
}

/// GET /api/properties/{id}/pricing
///
/// A `check_in` + `check_out` pair prices the whole stay; otherwise a single
/// night is priced, today when `date` is absent.
pub async fn get_pricing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PricingQuery>,
) -> ApiResult<Response> {
    require_property(&state, id).await?;
    let tier_id = parse_tier_id(query.bedroom_config_id.as_deref())?;

    let check_in = non_empty(query.check_in.as_deref());
    let check_out = non_empty(query.check_out.as_deref());
    if let (Some(check_in), Some(check_out)) = (check_in, check_out) {
        let check_in = parse_iso_date("check_in", check_in)?;
        let check_out = parse_iso_date("check_out", check_out)?;
        let quote = state
            .pricing
            .quote_stay(id, check_in, check_out, tier_id)
            .await?;

        return Ok(Json(StayPricingResponse {
            property_id: quote.property_id,
            check_in: quote.check_in,
            check_out: quote.check_out,
            nights: quote.nights,
            total_price: quote.total,
            breakdown: quote.breakdown,
        })
        .into_response());
    }

    let date = match non_empty(query.date.as_deref()) {
        Some(raw) => parse_iso_date("date", raw)?,
        None => Utc::now().date_naive(),
    };
    let night = state.pricing.quote_date(id, date, tier_id).await?;
    Ok(Json(night).into_response())
}

/// GET /api/properties/{id}/availability
pub async fn get_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AvailabilityResponse>> {
    require_property(&state, id).await?;
    let blocked = state.repos.blocked_dates.list_blocked_dates(id).await?;
    Ok(Json(AvailabilityResponse {
        property_id: id,
        blocked_dates: blocked.into_iter().map(|b| b.date).collect(),
    }))
}

pub(crate) async fn require_property(state: &AppState, id: Uuid) -> Result<Property, AppError> {
    state
        .repos
        .properties
        .get_property(id)
        .await?
        .ok_or_else(|| CoreError::not_found("Property").into())
}

/// Empty means "use the default tier".
pub(crate) fn parse_tier_id(raw: Option<&str>) -> Result<Option<Uuid>, CoreError> {
    match non_empty(raw) {
        None => Ok(None),
        Some(raw) => Uuid::parse_str(raw)
            .map(Some)
            .map_err(|_| CoreError::validation(format!("Invalid bedroom_config_id '{}'", raw))),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
