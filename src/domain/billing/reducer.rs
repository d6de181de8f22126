//! Subscription state reducer.
//!
//! Pure functions from a Stripe object (plus the current artisan record) to
//! an [`ArtisanPatch`]. Nothing here performs I/O, so redelivering the same
//! webhook reproduces the same patch.
//!
//! `at` is the instant the change is attributed to. Webhook handlers pass the
//! event's `created` time rather than the wall clock, which keeps
//! `premium_end_date` stable across redeliveries.

use crate::domain::artisan::{
    Artisan, ArtisanPatch, PlanTier, PremiumPatch, PremiumType, SubscriptionPatch,
    SubscriptionStatus,
};
use crate::domain::foundation::{Money, SubscriptionId, Timestamp};

/// The parts of a Stripe subscription object the reducer reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionSnapshot {
    pub id: SubscriptionId,
    pub status: SubscriptionStatus,
    /// `items[0].price.unit_amount`; zero when the subscription has no price.
    pub unit_amount: Money,
    pub cancel_at_period_end: bool,
    pub current_period_end: Option<Timestamp>,
}

/// `customer.subscription.updated`.
///
/// Plan and premium flags follow the price. A paid plan keeps its original
/// `premium_start_date`; the date is only written on first activation.
/// Reactivating a paid plan clears an old `premium_end_date` unless a
/// cancellation at period end is still pending.
pub fn subscription_updated(
    current: &Artisan,
    snapshot: &SubscriptionSnapshot,
    at: Timestamp,
) -> ArtisanPatch {
    let plan = PlanTier::from_monthly_price(snapshot.unit_amount);
    let canceled = snapshot.status.is_canceled();

    let subscription = SubscriptionPatch {
        status: Some(snapshot.status),
        current_plan: Some(plan),
        monthly_price: Some(snapshot.unit_amount),
        current_period_end: snapshot.current_period_end,
        cancel_at_period_end: Some(snapshot.cancel_at_period_end),
    };

    let premium = if plan.is_paid() && !canceled {
        PremiumPatch {
            is_premium: Some(true),
            premium_type: Some(PremiumType::Monthly),
            premium_start_date: if current.premium.premium_start_date.is_none() {
                Some(at)
            } else {
                None
            },
            premium_end_date: if !snapshot.cancel_at_period_end
                && current.premium.premium_end_date.is_some()
            {
                Some(None)
            } else {
                None
            },
        }
    } else {
        PremiumPatch {
            is_premium: Some(false),
            premium_end_date: if canceled { Some(Some(at)) } else { None },
            ..Default::default()
        }
    };

    ArtisanPatch {
        subscription,
        premium,
    }
}

/// `customer.subscription.deleted`. Overrides whatever state came before.
pub fn subscription_deleted(at: Timestamp) -> ArtisanPatch {
    ArtisanPatch {
        subscription: SubscriptionPatch {
            status: Some(SubscriptionStatus::Canceled),
            cancel_at_period_end: Some(false),
            ..Default::default()
        },
        premium: PremiumPatch {
            is_premium: Some(false),
            premium_end_date: Some(Some(at)),
            ..Default::default()
        },
    }
}

/// `invoice.payment_succeeded`. Confirms billing health only.
pub fn payment_succeeded(current_period_end: Option<Timestamp>) -> ArtisanPatch {
    ArtisanPatch {
        subscription: SubscriptionPatch {
            status: Some(SubscriptionStatus::Active),
            current_period_end,
            ..Default::default()
        },
        premium: PremiumPatch::default(),
    }
}

/// `invoice.payment_failed`. Suspends premium but keeps the plan so a later
/// successful payment does not require choosing it again.
pub fn payment_failed() -> ArtisanPatch {
    ArtisanPatch {
        subscription: SubscriptionPatch {
            status: Some(SubscriptionStatus::PastDue),
            ..Default::default()
        },
        premium: PremiumPatch {
            is_premium: Some(false),
            ..Default::default()
        },
    }
}

/// Self-service cancellation at period end.
///
/// Premium stays on until Stripe sends the deletion event; the end date is
/// scheduled for the last paid day.
pub fn self_cancellation(current: &Artisan, period_end: Option<Timestamp>) -> ArtisanPatch {
    ArtisanPatch {
        subscription: SubscriptionPatch {
            status: Some(SubscriptionStatus::Canceled),
            cancel_at_period_end: Some(true),
            current_period_end: period_end,
            ..Default::default()
        },
        premium: PremiumPatch {
            premium_end_date: if current.premium.is_premium {
                period_end.map(Some)
            } else {
                None
            },
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ArtisanId, UserId};

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_unix_secs(secs).unwrap()
    }

    fn artisan() -> Artisan {
        let mut a = Artisan::new(ArtisanId::new(), UserId::new("owner-1").unwrap(), "Atelier");
        a.link_subscription("cus_1", SubscriptionId::new("sub_1").unwrap());
        a
    }

    fn snapshot(cents: i64, status: SubscriptionStatus) -> SubscriptionSnapshot {
        SubscriptionSnapshot {
            id: SubscriptionId::new("sub_1").unwrap(),
            status,
            unit_amount: Money::from_cents(cents),
            cancel_at_period_end: false,
            current_period_end: Some(ts(1_800_000_000)),
        }
    }

    fn applied(mut a: Artisan, patch: &ArtisanPatch, at: Timestamp) -> Artisan {
        a.apply_patch(patch, at);
        a
    }

    // ══════════════════════════════════════════════════════════════
    // subscription.updated
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn updated_to_premium_activates_premium() {
        let a = artisan();
        let patch = subscription_updated(&a, &snapshot(12_900, SubscriptionStatus::Active), ts(100));
        let a = applied(a, &patch, ts(100));

        assert_eq!(a.subscription.current_plan, PlanTier::Premium);
        assert_eq!(a.subscription.monthly_price, Money::from_cents(12_900));
        assert_eq!(a.subscription.status, Some(SubscriptionStatus::Active));
        assert!(a.premium.is_premium);
        assert_eq!(a.premium.premium_type, Some(PremiumType::Monthly));
        assert_eq!(a.premium.premium_start_date, Some(ts(100)));
    }

    #[test]
    fn updated_to_basic_disables_premium_without_end_date() {
        let mut a = artisan();
        a.premium.is_premium = true;
        let patch = subscription_updated(&a, &snapshot(4_900, SubscriptionStatus::Active), ts(100));
        let a = applied(a, &patch, ts(100));

        assert_eq!(a.subscription.current_plan, PlanTier::Basic);
        assert!(!a.premium.is_premium);
        assert!(a.premium.premium_end_date.is_none());
    }

    #[test]
    fn updated_basic_and_canceled_sets_end_date() {
        let a = artisan();
        let patch =
            subscription_updated(&a, &snapshot(4_900, SubscriptionStatus::Canceled), ts(100));

        assert_eq!(patch.premium.is_premium, Some(false));
        assert_eq!(patch.premium.premium_end_date, Some(Some(ts(100))));
    }

    #[test]
    fn updated_paid_but_canceled_is_not_premium() {
        let a = artisan();
        let patch =
            subscription_updated(&a, &snapshot(19_900, SubscriptionStatus::Canceled), ts(100));

        assert_eq!(patch.subscription.current_plan, Some(PlanTier::PremiumPlus));
        assert_eq!(patch.premium.is_premium, Some(false));
        assert_eq!(patch.premium.premium_end_date, Some(Some(ts(100))));
    }

    #[test]
    fn first_activation_date_survives_upgrade() {
        let a = artisan();
        let first = subscription_updated(&a, &snapshot(12_900, SubscriptionStatus::Active), ts(100));
        let a = applied(a, &first, ts(100));

        let upgrade = subscription_updated(&a, &snapshot(19_900, SubscriptionStatus::Active), ts(500));
        let a = applied(a, &upgrade, ts(500));

        assert_eq!(a.subscription.current_plan, PlanTier::PremiumPlus);
        assert_eq!(a.premium.premium_start_date, Some(ts(100)));
    }

    #[test]
    fn updated_is_idempotent() {
        let snap = snapshot(19_900, SubscriptionStatus::Active);
        let a = artisan();

        let once = applied(a.clone(), &subscription_updated(&a, &snap, ts(100)), ts(100));
        let twice = applied(once.clone(), &subscription_updated(&once, &snap, ts(100)), ts(100));

        assert_eq!(once, twice);
    }

    #[test]
    fn updated_passes_cancel_flag_through() {
        let a = artisan();
        let mut snap = snapshot(12_900, SubscriptionStatus::Active);
        snap.cancel_at_period_end = true;

        let patch = subscription_updated(&a, &snap, ts(100));

        assert_eq!(patch.subscription.cancel_at_period_end, Some(true));
        assert_eq!(patch.subscription.current_period_end, Some(ts(1_800_000_000)));
    }

    #[test]
    fn resubscribing_after_deletion_clears_end_date() {
        let a = artisan();
        let a = applied(
            a.clone(),
            &subscription_updated(&a, &snapshot(12_900, SubscriptionStatus::Active), ts(100)),
            ts(100),
        );
        let a = applied(a, &subscription_deleted(ts(200)), ts(200));
        assert_eq!(a.premium.premium_end_date, Some(ts(200)));

        let patch = subscription_updated(&a, &snapshot(19_900, SubscriptionStatus::Active), ts(300));
        let a = applied(a, &patch, ts(300));

        assert!(a.premium.is_premium);
        assert_eq!(a.subscription.status, Some(SubscriptionStatus::Active));
        assert!(a.premium.premium_end_date.is_none());
        assert_eq!(a.premium.premium_start_date, Some(ts(100)));
    }

    #[test]
    fn pending_cancellation_keeps_scheduled_end_date() {
        let mut a = artisan();
        a.premium.is_premium = true;
        let a = applied(a.clone(), &self_cancellation(&a, Some(ts(3_000))), ts(100));

        let mut snap = snapshot(12_900, SubscriptionStatus::Active);
        snap.cancel_at_period_end = true;
        let patch = subscription_updated(&a, &snap, ts(150));
        let a = applied(a, &patch, ts(150));

        assert_eq!(patch.premium.premium_end_date, None);
        assert_eq!(a.premium.premium_end_date, Some(ts(3_000)));
    }

    // ══════════════════════════════════════════════════════════════
    // subscription.deleted
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn deletion_always_cancels_and_removes_premium() {
        for status in [
            None,
            Some(SubscriptionStatus::Active),
            Some(SubscriptionStatus::PastDue),
            Some(SubscriptionStatus::Trialing),
        ] {
            let mut a = artisan();
            a.subscription.status = status;
            a.subscription.cancel_at_period_end = true;
            a.premium.is_premium = true;

            let a = applied(a, &subscription_deleted(ts(900)), ts(900));

            assert_eq!(a.subscription.status, Some(SubscriptionStatus::Canceled));
            assert!(!a.subscription.cancel_at_period_end);
            assert!(!a.premium.is_premium);
            assert_eq!(a.premium.premium_end_date, Some(ts(900)));
        }
    }

    #[test]
    fn deletion_keeps_plan() {
        let mut a = artisan();
        a.subscription.current_plan = PlanTier::PremiumPlus;

        let a = applied(a, &subscription_deleted(ts(900)), ts(900));

        assert_eq!(a.subscription.current_plan, PlanTier::PremiumPlus);
    }

    // ══════════════════════════════════════════════════════════════
    // invoice.payment_*
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn payment_succeeded_only_touches_status_and_period() {
        let mut a = artisan();
        a.subscription.status = Some(SubscriptionStatus::PastDue);
        a.subscription.current_plan = PlanTier::Premium;

        let patch = payment_succeeded(Some(ts(2_000)));
        assert!(patch.premium.is_empty());

        let a = applied(a, &patch, ts(10));
        assert_eq!(a.subscription.status, Some(SubscriptionStatus::Active));
        assert_eq!(a.subscription.current_period_end, Some(ts(2_000)));
        assert_eq!(a.subscription.current_plan, PlanTier::Premium);
        assert!(!a.premium.is_premium);
    }

    #[test]
    fn payment_failed_keeps_plan_and_suspends_premium() {
        let mut a = artisan();
        a.subscription.current_plan = PlanTier::Premium;
        a.premium.is_premium = true;

        let a = applied(a, &payment_failed(), ts(10));

        assert_eq!(a.subscription.current_plan, PlanTier::Premium);
        assert_eq!(a.subscription.status, Some(SubscriptionStatus::PastDue));
        assert!(!a.premium.is_premium);
    }

    // ══════════════════════════════════════════════════════════════
    // Self-service cancellation
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn self_cancellation_schedules_premium_end_when_premium() {
        let mut a = artisan();
        a.premium.is_premium = true;

        let patch = self_cancellation(&a, Some(ts(3_000)));

        assert_eq!(patch.subscription.status, Some(SubscriptionStatus::Canceled));
        assert_eq!(patch.subscription.cancel_at_period_end, Some(true));
        assert_eq!(patch.subscription.current_period_end, Some(ts(3_000)));
        assert_eq!(patch.premium.premium_end_date, Some(Some(ts(3_000))));
        assert_eq!(patch.premium.is_premium, None);
    }

    #[test]
    fn self_cancellation_without_premium_leaves_end_date() {
        let a = artisan();
        let patch = self_cancellation(&a, Some(ts(3_000)));
        assert!(patch.premium.premium_end_date.is_none());
    }
}
