use arama_core::dates::parse_iso_date;
use arama_core::{CoreError, Enquiry, EnquiryStatus, NewEnquiry};
use arama_shared::{EnquiryNotification, Masked};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiResult, AppError};
use crate::properties::{parse_tier_id, require_property};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateEnquiryRequest {
    pub property_id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub check_in: String,
    pub check_out: String,
    pub guests: Option<i32>,
    #[serde(alias = "tier_id")]
    pub bedroom_config_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// POST /api/enquiries
///
/// Prices the stay, stores the enquiry as pending and queues the admin
/// notification without waiting for it.
pub async fn create_enquiry(
    State(state): State<AppState>,
    payload: Result<Json<CreateEnquiryRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;

    if [&req.name, &req.email, &req.check_in, &req.check_out]
        .iter()
        .any(|field| field.trim().is_empty())
    {
        return Err(AppError::ValidationError(
            "Name, email, check_in, and check_out are required".to_string(),
        ));
    }
    let check_in = parse_iso_date("check_in", &req.check_in)?;
    let check_out = parse_iso_date("check_out", &req.check_out)?;
    if check_out <= check_in {
        return Err(AppError::ValidationError(
            "check_out must be after check_in".to_string(),
        ));
    }
    let guests = req.guests.unwrap_or(1);
    if guests < 1 {
        return Err(AppError::ValidationError("Guests must be at least 1".to_string()));
    }
    let tier_id = parse_tier_id(req.bedroom_config_id.as_deref())?;
    let property_id = resolve_property(&state, req.property_id.as_deref()).await?;

    let tier = state.pricing.resolve_tier(tier_id).await?;
    let quote = state
        .pricing
        .quote_stay(property_id, check_in, check_out, tier_id)
        .await?;

    let enquiry = state
        .repos
        .enquiries
        .create_enquiry(&NewEnquiry {
            property_id,
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            phone: req.phone.trim().to_string(),
            check_in,
            check_out,
            guests,
            tier_id: tier.as_ref().map(|t| t.id),
            message: req.message,
            total_price: quote.total,
        })
        .await?;

    let notification = EnquiryNotification {
        enquiry_id: enquiry.id,
        property_id,
        name: enquiry.name.clone(),
        email: Masked::new(enquiry.email.clone()),
        phone: Masked::new(enquiry.phone.clone()),
        check_in,
        check_out,
        guests,
        tier_name: tier.map(|t| t.name),
        total_price: enquiry.total_price,
        message: enquiry.message.clone(),
        created_at: enquiry.created_at,
    };
    tracing::info!(
        "Enquiry {} from {} for {} nights ({})",
        enquiry.id,
        notification.email,
        quote.nights,
        enquiry.total_price
    );
    state.notifications.submit(notification);

    Ok((StatusCode::CREATED, Json(enquiry)))
}

/// GET /api/admin/enquiries
pub async fn list_enquiries(State(state): State<AppState>) -> ApiResult<Json<Vec<Enquiry>>> {
    Ok(Json(state.repos.enquiries.list_enquiries().await?))
}

/// PUT /api/admin/enquiries/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<Json<Enquiry>> {
    let Json(req) = payload?;
    let status: EnquiryStatus = req.status.parse()?;

    state
        .repos
        .enquiries
        .update_enquiry_status(id, status)
        .await?
        .map(Json)
        .ok_or_else(|| CoreError::not_found("Enquiry").into())
}

/// GET /api/admin/enquiries/export
pub async fn export_enquiries(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let enquiries = state.repos.enquiries.list_enquiries().await?;
    let body = enquiries_csv(&enquiries)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, "attachment; filename=enquiries.csv"),
        ],
        body,
    ))
}

pub fn enquiries_csv(enquiries: &[Enquiry]) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "ID",
        "Name",
        "Email",
        "Phone",
        "Check-In",
        "Check-Out",
        "Guests",
        "Total Price",
        "Status",
        "Created At",
    ])?;

    for e in enquiries {
        writer.write_record([
            e.id.to_string(),
            e.name.clone(),
            e.email.clone(),
            e.phone.clone(),
            e.check_in.to_string(),
            e.check_out.to_string(),
            e.guests.to_string(),
            format!("{:.2}", e.total_price),
            e.status.to_string(),
            e.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush csv: {}", e))
}

/// The given property, or the first listed one when none is given.
async fn resolve_property(state: &AppState, raw: Option<&str>) -> Result<Uuid, AppError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => {
            let id = Uuid::parse_str(raw).map_err(|_| {
                AppError::ValidationError(format!("Invalid property_id '{}'", raw))
            })?;
            Ok(require_property(state, id).await?.id)
        }
        None => state
            .repos
            .properties
            .list_properties()
            .await?
            .first()
            .map(|p| p.id)
            .ok_or_else(|| CoreError::not_found("Property").into()),
    }
}
