//! Subscription status as reported by Stripe.
//!
//! Stored verbatim on the artisan record. The application only reasons about
//! `active`, `past_due` and `canceled`; the remaining Stripe statuses are
//! carried through so the record never lies about what Stripe said.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Canceled,
    Trialing,
    Incomplete,
    IncompleteExpired,
    Unpaid,
    Paused,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::Incomplete => "incomplete",
            SubscriptionStatus::IncompleteExpired => "incomplete_expired",
            SubscriptionStatus::Unpaid => "unpaid",
            SubscriptionStatus::Paused => "paused",
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, SubscriptionStatus::Canceled)
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "past_due" => Ok(SubscriptionStatus::PastDue),
            // Stripe spells it "canceled"; older dashboard exports used "cancelled".
            "canceled" | "cancelled" => Ok(SubscriptionStatus::Canceled),
            "trialing" => Ok(SubscriptionStatus::Trialing),
            "incomplete" => Ok(SubscriptionStatus::Incomplete),
            "incomplete_expired" => Ok(SubscriptionStatus::IncompleteExpired),
            "unpaid" => Ok(SubscriptionStatus::Unpaid),
            "paused" => Ok(SubscriptionStatus::Paused),
            other => Err(ValidationError::invalid_format(
                "subscription_status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_stripe_status() {
        for raw in [
            "active",
            "past_due",
            "canceled",
            "trialing",
            "incomplete",
            "incomplete_expired",
            "unpaid",
            "paused",
        ] {
            let status: SubscriptionStatus = raw.parse().unwrap();
            assert_eq!(status.as_str(), raw);
        }
    }

    #[test]
    fn accepts_british_spelling_of_canceled() {
        assert_eq!(
            "cancelled".parse::<SubscriptionStatus>().unwrap(),
            SubscriptionStatus::Canceled
        );
    }

    #[test]
    fn rejects_unknown_status() {
        assert!("expired".parse::<SubscriptionStatus>().is_err());
    }

    #[test]
    fn only_canceled_is_canceled() {
        assert!(SubscriptionStatus::Canceled.is_canceled());
        assert!(!SubscriptionStatus::PastDue.is_canceled());
    }
}
