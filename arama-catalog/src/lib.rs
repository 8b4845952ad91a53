pub mod season;
pub mod pricing;

pub use season::SeasonResolver;
pub use pricing::{PricingConfig, PricingEngine};
