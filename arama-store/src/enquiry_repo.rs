use arama_core::repository::EnquiryRepository;
use arama_core::{CoreError, CoreResult, Enquiry, EnquiryStatus, NewEnquiry};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgEnquiryRepository {
    pool: PgPool,
}

impl PgEnquiryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct EnquiryRow {
    id: Uuid,
    property_id: Uuid,
    name: String,
    email: String,
    phone: String,
    check_in: NaiveDate,
    check_out: NaiveDate,
    guests: i32,
    tier_id: Option<Uuid>,
    message: String,
    total_price: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EnquiryRow> for Enquiry {
    type Error = CoreError;

    fn try_from(row: EnquiryRow) -> Result<Self, Self::Error> {
        Ok(Enquiry {
            id: row.id,
            property_id: row.property_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            check_in: row.check_in,
            check_out: row.check_out,
            guests: row.guests,
            tier_id: row.tier_id,
            message: row.message,
            total_price: row.total_price,
            status: row.status.parse().map_err(CoreError::storage)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const COLUMNS: &str = "id, property_id, name, email, phone, check_in, check_out, guests, tier_id, \
                       message, total_price, status, created_at, updated_at";

#[async_trait]
impl EnquiryRepository for PgEnquiryRepository {
    async fn list_enquiries(&self) -> CoreResult<Vec<Enquiry>> {
        let rows = sqlx::query_as::<_, EnquiryRow>(&format!(
            "SELECT {} FROM enquiries ORDER BY created_at DESC",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(CoreError::storage)?;

        rows.into_iter().map(Enquiry::try_from).collect()
    }

    async fn get_enquiry(&self, id: Uuid) -> CoreResult<Option<Enquiry>> {
        let row = sqlx::query_as::<_, EnquiryRow>(&format!(
            "SELECT {} FROM enquiries WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(CoreError::storage)?;

        row.map(Enquiry::try_from).transpose()
    }

    async fn create_enquiry(&self, enquiry: &NewEnquiry) -> CoreResult<Enquiry> {
        let row = sqlx::query_as::<_, EnquiryRow>(&format!(
            r#"
            INSERT INTO enquiries (id, property_id, name, email, phone, check_in, check_out, guests, tier_id, message, total_price, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(enquiry.property_id)
        .bind(&enquiry.name)
        .bind(&enquiry.email)
        .bind(&enquiry.phone)
        .bind(enquiry.check_in)
        .bind(enquiry.check_out)
        .bind(enquiry.guests)
        .bind(enquiry.tier_id)
        .bind(&enquiry.message)
        .bind(enquiry.total_price)
        .bind(EnquiryStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(CoreError::storage)?;

        Enquiry::try_from(row)
    }

    async fn update_enquiry_status(
        &self,
        id: Uuid,
        status: EnquiryStatus,
    ) -> CoreResult<Option<Enquiry>> {
        let row = sqlx::query_as::<_, EnquiryRow>(&format!(
            "UPDATE enquiries SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            COLUMNS
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(CoreError::storage)?;

        row.map(Enquiry::try_from).transpose()
    }
}
