//! Typed partial updates for the artisan record.
//!
//! Every field is optional: `None` leaves the stored value alone, `Some`
//! overwrites it. Optional stored values can only be set through a patch,
//! except `premium_end_date`, which a reactivation clears with `Some(None)`.

use crate::domain::foundation::{Money, Timestamp};

use super::{PlanTier, PremiumType, SubscriptionStatus};

/// Changes to the subscription block of an artisan.
///
/// This is also the shape written to the mirrored subscription record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionPatch {
    pub status: Option<SubscriptionStatus>,
    pub current_plan: Option<PlanTier>,
    pub monthly_price: Option<Money>,
    pub current_period_end: Option<Timestamp>,
    pub cancel_at_period_end: Option<bool>,
}

impl SubscriptionPatch {
    pub fn is_empty(&self) -> bool {
        *self == SubscriptionPatch::default()
    }
}

/// Changes to the premium feature flags of an artisan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PremiumPatch {
    pub is_premium: Option<bool>,
    pub premium_type: Option<PremiumType>,
    pub premium_start_date: Option<Timestamp>,
    /// `Some(None)` clears a stale end date.
    pub premium_end_date: Option<Option<Timestamp>>,
}

impl PremiumPatch {
    pub fn is_empty(&self) -> bool {
        *self == PremiumPatch::default()
    }
}

/// A full patch produced by the subscription reducer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtisanPatch {
    pub subscription: SubscriptionPatch,
    pub premium: PremiumPatch,
}

impl ArtisanPatch {
    pub fn is_empty(&self) -> bool {
        self.subscription.is_empty() && self.premium.is_empty()
    }
}

/// Overwrites `target` when the patch carries a value.
pub(crate) fn merge<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *target = v.clone();
    }
}

/// Same as [`merge`] for optional stored fields.
pub(crate) fn merge_opt<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        *target = value.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_patch_is_empty() {
        assert!(ArtisanPatch::default().is_empty());
    }

    #[test]
    fn one_field_makes_patch_non_empty() {
        let patch = ArtisanPatch {
            premium: PremiumPatch {
                is_premium: Some(false),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(!patch.is_empty());
        assert!(patch.subscription.is_empty());
    }

    #[test]
    fn merge_leaves_target_on_none() {
        let mut value = 3;
        merge(&mut value, &None);
        assert_eq!(value, 3);
        merge(&mut value, &Some(7));
        assert_eq!(value, 7);
    }

    #[test]
    fn merge_opt_never_clears() {
        let mut value = Some(1);
        merge_opt(&mut value, &None);
        assert_eq!(value, Some(1));
        merge_opt(&mut value, &Some(2));
        assert_eq!(value, Some(2));
    }
}
