use arama_core::{CoreResult, NewBedroomTier, NewProperty, NewSeason};
use rust_decimal_macros::dec;
use tracing::info;

use crate::Repositories;

/// Populates an empty store with the villa, its seasons and its bedroom
/// tiers. Tables that already hold rows are left alone.
pub async fn seed_defaults(repos: &Repositories) -> CoreResult<()> {
    if repos.properties.list_properties().await?.is_empty() {
        let property = repos.properties.create_property(&villa()).await?;
        info!("Seeded property {} ({})", property.name, property.id);
    }

    if repos.seasons.list_seasons().await?.is_empty() {
        for season in seasons()? {
            repos.seasons.create_season(&season).await?;
        }
        info!("Seeded default seasons");
    }

    if repos.tiers.list_tiers().await?.is_empty() {
        for tier in tiers() {
            repos.tiers.create_tier(&tier).await?;
        }
        info!("Seeded default bedroom tiers");
    }

    Ok(())
}

fn villa() -> NewProperty {
    NewProperty {
        name: "Villa Arama Riverside".to_string(),
        tagline: "A private riverside retreat".to_string(),
        description: "Three-bedroom villa with a private pool, open-air living and river views."
            .to_string(),
        location: "Riverside".to_string(),
        image_url: String::new(),
        images: Vec::new(),
        amenities: ["Private pool", "Wi-Fi", "Air conditioning", "Kitchen", "Parking"]
            .iter()
            .map(|a| a.to_string())
            .collect(),
        max_guests: 8,
        bedrooms: 3,
        bathrooms: 3,
    }
}

fn seasons() -> CoreResult<Vec<NewSeason>> {
    Ok(vec![
        NewSeason {
            name: "Peak Season".to_string(),
            start: "12-15".parse()?,
            end: "01-10".parse()?,
            nightly_rate: dec!(350),
            is_default: false,
        },
        NewSeason {
            name: "High Season".to_string(),
            start: "07-01".parse()?,
            end: "08-31".parse()?,
            nightly_rate: dec!(280),
            is_default: false,
        },
        NewSeason {
            name: "Regular Season".to_string(),
            start: "01-01".parse()?,
            end: "12-31".parse()?,
            nightly_rate: dec!(200),
            is_default: true,
        },
    ])
}

fn tiers() -> Vec<NewBedroomTier> {
    vec![
        NewBedroomTier {
            name: "1 Bedroom Suite".to_string(),
            description: "Master suite for couples".to_string(),
            surcharge: dec!(0),
            max_guests: 2,
            is_default: true,
        },
        NewBedroomTier {
            name: "2 Bedroom Villa".to_string(),
            description: "Two bedrooms for small families".to_string(),
            surcharge: dec!(75),
            max_guests: 4,
            is_default: false,
        },
        NewBedroomTier {
            name: "3 Bedroom Estate".to_string(),
            description: "The whole villa".to_string(),
            surcharge: dec!(150),
            max_guests: 8,
            is_default: false,
        },
    ]
}
