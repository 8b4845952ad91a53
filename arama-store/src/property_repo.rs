use arama_core::repository::PropertyRepository;
use arama_core::{CoreError, CoreResult, NewProperty, Property};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgPropertyRepository {
    pool: PgPool,
}

impl PgPropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PropertyRow {
    id: Uuid,
    name: String,
    tagline: String,
    description: String,
    location: String,
    image_url: String,
    images: Vec<String>,
    amenities: Vec<String>,
    max_guests: i32,
    bedrooms: i32,
    bathrooms: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PropertyRow> for Property {
    fn from(row: PropertyRow) -> Self {
        Property {
            id: row.id,
            name: row.name,
            tagline: row.tagline,
            description: row.description,
            location: row.location,
            image_url: row.image_url,
            images: row.images,
            amenities: row.amenities,
            max_guests: row.max_guests,
            bedrooms: row.bedrooms,
            bathrooms: row.bathrooms,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str = "id, name, tagline, description, location, image_url, images, amenities, \
                       max_guests, bedrooms, bathrooms, created_at, updated_at";

#[async_trait]
impl PropertyRepository for PgPropertyRepository {
    async fn list_properties(&self) -> CoreResult<Vec<Property>> {
        let rows = sqlx::query_as::<_, PropertyRow>(&format!(
            "SELECT {} FROM properties ORDER BY created_at ASC",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(CoreError::storage)?;

        Ok(rows.into_iter().map(Property::from).collect())
    }

    async fn get_property(&self, id: Uuid) -> CoreResult<Option<Property>> {
        let row = sqlx::query_as::<_, PropertyRow>(&format!(
            "SELECT {} FROM properties WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(CoreError::storage)?;

        Ok(row.map(Property::from))
    }

    async fn create_property(&self, property: &NewProperty) -> CoreResult<Property> {
        let row = sqlx::query_as::<_, PropertyRow>(&format!(
            r#"
            INSERT INTO properties (id, name, tagline, description, location, image_url, images, amenities, max_guests, bedrooms, bathrooms)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&property.name)
        .bind(&property.tagline)
        .bind(&property.description)
        .bind(&property.location)
        .bind(&property.image_url)
        .bind(&property.images)
        .bind(&property.amenities)
        .bind(property.max_guests)
        .bind(property.bedrooms)
        .bind(property.bathrooms)
        .fetch_one(&self.pool)
        .await
        .map_err(CoreError::storage)?;

        Ok(row.into())
    }
}
