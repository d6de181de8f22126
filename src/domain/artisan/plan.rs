//! Subscription plan tiers.
//!
//! The plan is never chosen directly: it is derived from the monthly price
//! Stripe bills the artisan, so a price change in the Stripe catalog moves
//! artisans between tiers without a code change.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Money, ValidationError};

/// Monthly price at or above which an artisan is on Premium+.
pub const PREMIUM_PLUS_THRESHOLD: Money = Money::from_cents(19_900);

/// Monthly price at or above which an artisan is on Premium.
pub const PREMIUM_THRESHOLD: Money = Money::from_cents(12_900);

/// Artisan subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    /// Free listing, no premium profile features.
    Basic,

    /// Banner photos and boosted placement.
    Premium,

    /// Premium plus the "Top Artisan" badge.
    PremiumPlus,
}

impl PlanTier {
    /// Derives the plan from a monthly price.
    ///
    /// | monthly price | plan          |
    /// |---------------|---------------|
    /// | >= 199.00     | premium_plus  |
    /// | >= 129.00     | premium       |
    /// | otherwise     | basic         |
    pub fn from_monthly_price(price: Money) -> Self {
        if price >= PREMIUM_PLUS_THRESHOLD {
            PlanTier::PremiumPlus
        } else if price >= PREMIUM_THRESHOLD {
            PlanTier::Premium
        } else {
            PlanTier::Basic
        }
    }

    pub fn is_paid(&self) -> bool {
        !matches!(self, PlanTier::Basic)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Basic => "basic",
            PlanTier::Premium => "premium",
            PlanTier::PremiumPlus => "premium_plus",
        }
    }
}

impl Default for PlanTier {
    fn default() -> Self {
        PlanTier::Basic
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(PlanTier::Basic),
            "premium" => Ok(PlanTier::Premium),
            "premium_plus" => Ok(PlanTier::PremiumPlus),
            other => Err(ValidationError::invalid_format(
                "current_plan",
                format!("unknown plan '{}'", other),
            )),
        }
    }
}
