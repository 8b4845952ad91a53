use arama_core::{FeedSubscription, NewFeedSubscription};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{ApiResult, AppError};
use crate::properties::require_property;
use crate::state::AppState;

const DEFAULT_SOURCE: &str = "other";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddFeedRequest {
    pub property_id: String,
    pub url: String,
    pub source: String,
}

/// GET /api/admin/ical
pub async fn list_feeds(State(state): State<AppState>) -> ApiResult<Json<Vec<FeedSubscription>>> {
    Ok(Json(state.repos.feeds.list_subscriptions().await?))
}

/// POST /api/admin/ical
///
/// Stores the subscription and starts its first sync in the background.
pub async fn add_feed(
    State(state): State<AppState>,
    payload: Result<Json<AddFeedRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;
    if req.url.trim().is_empty() || req.property_id.trim().is_empty() {
        return Err(AppError::ValidationError(
            "URL and property_id are required".to_string(),
        ));
    }
    let property_id = Uuid::parse_str(req.property_id.trim()).map_err(|_| {
        AppError::ValidationError(format!("Invalid property_id '{}'", req.property_id))
    })?;
    require_property(&state, property_id).await?;

    let source = match req.source.trim() {
        "" => DEFAULT_SOURCE.to_string(),
        source => source.to_lowercase(),
    };
    let feed = state
        .repos
        .feeds
        .create_subscription(&NewFeedSubscription {
            property_id,
            url: req.url.trim().to_string(),
            source,
        })
        .await?;

    tracing::info!("Added {} feed {} for property {}", feed.source, feed.id, property_id);
    state.sync.dispatch(feed.clone());

    Ok((StatusCode::CREATED, Json(feed)))
}

/// DELETE /api/admin/ical/{id}
///
/// Nights already blocked by the feed stay blocked.
pub async fn delete_feed(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    if !state.repos.feeds.delete_subscription(id).await? {
        return Err(AppError::NotFoundError("iCal URL not found".to_string()));
    }
    Ok(Json(json!({ "message": "iCal URL deleted successfully" })))
}

/// POST /api/admin/ical/sync
pub async fn sync_all(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let count = state.sync.dispatch_all().await?;
    Ok(Json(json!({
        "message": "Sync triggered",
        "count": count,
    })))
}
