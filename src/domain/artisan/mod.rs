//! Artisan domain module.
//!
//! - `aggregate` - Artisan record with its subscription and premium blocks
//! - `plan` - Plan tiers derived from the monthly price
//! - `subscription_status` - Stripe subscription statuses
//! - `patch` - Typed partial updates merged into the record

mod aggregate;
mod patch;
mod plan;
mod subscription_status;

pub use aggregate::{Artisan, PremiumFeatures, PremiumType, SubscriptionState};
pub use patch::{ArtisanPatch, PremiumPatch, SubscriptionPatch};
pub use plan::{PlanTier, PREMIUM_PLUS_THRESHOLD, PREMIUM_THRESHOLD};
pub use subscription_status::SubscriptionStatus;
