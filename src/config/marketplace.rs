//! Marketplace listing configuration

use serde::Deserialize;

use crate::application::handlers::marketplace::MAX_LISTING_LIMIT;
use crate::ports::ListingStrategy;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct MarketplaceConfig {
    /// Strategy used when the request does not pick one.
    #[serde(default)]
    pub listing_strategy: ListingStrategy,

    #[serde(default = "default_listing_limit")]
    pub default_listing_limit: usize,
}

impl MarketplaceConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_listing_limit == 0 || self.default_listing_limit > MAX_LISTING_LIMIT {
            return Err(ValidationError::InvalidListingLimit(MAX_LISTING_LIMIT));
        }
        Ok(())
    }
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            listing_strategy: ListingStrategy::default(),
            default_listing_limit: default_listing_limit(),
        }
    }
}

fn default_listing_limit() -> usize {
    20
}
