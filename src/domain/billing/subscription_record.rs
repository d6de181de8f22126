//! Mirrored subscription record.
//!
//! A convenience projection of Stripe state keyed by subscription id, kept
//! for reporting queries. The artisan record stays authoritative; the mirror
//! may lag or miss updates.

use serde::{Deserialize, Serialize};

use crate::domain::artisan::{PlanTier, SubscriptionPatch, SubscriptionStatus};
use crate::domain::foundation::{ArtisanId, Money, SubscriptionId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub subscription_id: SubscriptionId,
    pub artisan_id: ArtisanId,
    pub stripe_customer_id: Option<String>,
    pub status: SubscriptionStatus,
    pub plan: PlanTier,
    pub monthly_price: Money,
    pub current_period_end: Option<Timestamp>,
    pub cancel_at_period_end: bool,
    pub updated_at: Timestamp,
}

impl SubscriptionRecord {
    /// Applies the subscription half of an artisan patch.
    pub fn apply(&mut self, patch: &SubscriptionPatch, now: Timestamp) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(plan) = patch.current_plan {
            self.plan = plan;
        }
        if let Some(price) = patch.monthly_price {
            self.monthly_price = price;
        }
        if patch.current_period_end.is_some() {
            self.current_period_end = patch.current_period_end;
        }
        if let Some(flag) = patch.cancel_at_period_end {
            self.cancel_at_period_end = flag;
        }
        self.updated_at = now;
    }
}
