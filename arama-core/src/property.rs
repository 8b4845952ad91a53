use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    pub id: Uuid,
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub location: String,
    pub image_url: String,
    pub images: Vec<String>,
    pub amenities: Vec<String>,
    pub max_guests: i32,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProperty {
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub location: String,
    pub image_url: String,
    pub images: Vec<String>,
    pub amenities: Vec<String>,
    pub max_guests: i32,
    pub bedrooms: i32,
    pub bathrooms: i32,
}
