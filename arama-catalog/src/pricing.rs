use std::sync::Arc;

use arama_core::dates;
use arama_core::repository::{BedroomTierRepository, SeasonRepository};
use arama_core::{BedroomTier, CoreError, CoreResult, NightlyQuote, StayQuote};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::season::SeasonResolver;

/// Rate applied when no season resolves at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    pub baseline_rate: Decimal,
    pub baseline_label: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            baseline_rate: Decimal::from(200),
            baseline_label: "Regular Season".to_string(),
        }
    }
}

/// Season and bedroom-tier pricing for stays
pub struct PricingEngine {
    seasons: Arc<dyn SeasonRepository>,
    tiers: Arc<dyn BedroomTierRepository>,
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(
        seasons: Arc<dyn SeasonRepository>,
        tiers: Arc<dyn BedroomTierRepository>,
        config: PricingConfig,
    ) -> Self {
        Self {
            seasons,
            tiers,
            config,
        }
    }

    /// Price every night of `[check_in, check_out)`.
    ///
    /// A non-positive range yields an empty breakdown and a zero total.
    pub async fn quote_stay(
        &self,
        property_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        tier_id: Option<Uuid>,
    ) -> CoreResult<StayQuote> {
        let tier = self.resolve_tier(tier_id).await?;
        let resolver = self.resolver().await?;

        let breakdown: Vec<NightlyQuote> = dates::nights(check_in, check_out)
            .map(|night| self.price_night(&resolver, property_id, night, tier.as_ref()))
            .collect();
        let total = breakdown.iter().map(|n| n.total).sum();

        Ok(StayQuote {
            property_id,
            check_in,
            check_out,
            nights: breakdown.len(),
            total,
            breakdown,
        })
    }

    /// Price a single night.
    pub async fn quote_date(
        &self,
        property_id: Uuid,
        date: NaiveDate,
        tier_id: Option<Uuid>,
    ) -> CoreResult<NightlyQuote> {
        let tier = self.resolve_tier(tier_id).await?;
        let resolver = self.resolver().await?;
        Ok(self.price_night(&resolver, property_id, date, tier.as_ref()))
    }

    /// Explicit tier by id, else the default tier, else the cheapest tier.
    /// `None` when no tiers exist.
    pub async fn resolve_tier(&self, tier_id: Option<Uuid>) -> CoreResult<Option<BedroomTier>> {
        if let Some(id) = tier_id {
            return self
                .tiers
                .get_tier(id)
                .await?
                .map(Some)
                .ok_or_else(|| CoreError::not_found(format!("Bedroom tier {}", id)));
        }

        let tiers = self.tiers.list_tiers().await?;
        Ok(fallback_tier(&tiers).cloned())
    }

    async fn resolver(&self) -> CoreResult<SeasonResolver> {
        let seasons = self.seasons.list_seasons().await?;
        Ok(SeasonResolver::new(seasons))
    }

    fn price_night(
        &self,
        resolver: &SeasonResolver,
        property_id: Uuid,
        date: NaiveDate,
        tier: Option<&BedroomTier>,
    ) -> NightlyQuote {
        let (season_name, season_rate) = match resolver.resolve(date) {
            Some(season) => (season.name.clone(), season.nightly_rate),
            None => (self.config.baseline_label.clone(), self.config.baseline_rate),
        };
        let tier_surcharge = tier.map(|t| t.surcharge).unwrap_or(Decimal::ZERO);

        NightlyQuote {
            property_id,
            date,
            season_name,
            season_rate,
            tier_id: tier.map(|t| t.id),
            tier_name: tier.map(|t| t.name.clone()).unwrap_or_default(),
            tier_surcharge,
            total: season_rate + tier_surcharge,
        }
    }
}

fn fallback_tier(tiers: &[BedroomTier]) -> Option<&BedroomTier> {
    fn cheapest<'a>(candidates: Vec<&'a BedroomTier>) -> Option<&'a BedroomTier> {
        candidates
            .into_iter()
            .min_by(|a, b| a.surcharge.cmp(&b.surcharge).then_with(|| a.name.cmp(&b.name)))
    }

    let defaults: Vec<&BedroomTier> = tiers.iter().filter(|t| t.is_default).collect();
    if defaults.len() > 1 {
        tracing::warn!(
            "{} bedroom tiers are flagged default; using the cheapest one",
            defaults.len()
        );
    }
    if defaults.is_empty() {
        cheapest(tiers.iter().collect())
    } else {
        cheapest(defaults)
    }
}
