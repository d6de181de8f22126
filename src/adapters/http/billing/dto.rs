//! HTTP DTOs for billing endpoints.
//!
//! Field names are camelCase to match what the artisan dashboard already reads.

use serde::Serialize;

use crate::application::handlers::billing::{CancelSubscriptionResult, GetSubscriptionResult};
use crate::domain::artisan::SubscriptionState;
use crate::domain::foundation::Timestamp;

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Provider-side view of the subscription.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSummary {
    pub id: String,
    /// Stripe status string (`active`, `past_due`, `canceled`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub cancel_at_period_end: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_period_end: Option<Timestamp>,
}

impl SubscriptionSummary {
    /// `None` when no Stripe subscription is linked.
    pub fn from_state(state: &SubscriptionState) -> Option<Self> {
        let id = state.stripe_subscription_id.as_ref()?;
        Some(Self {
            id: id.to_string(),
            status: state.status.map(|s| s.as_str().to_string()),
            cancel_at_period_end: state.cancel_at_period_end,
            current_period_end: state.current_period_end,
        })
    }
}

/// Body of `POST /api/artisans/me/subscription/cancel`.
#[derive(Debug, Clone, Serialize)]
pub struct CancelSubscriptionResponse {
    pub success: bool,
    pub message: String,
    pub subscription: Option<SubscriptionSummary>,
}

impl From<CancelSubscriptionResult> for CancelSubscriptionResponse {
    fn from(result: CancelSubscriptionResult) -> Self {
        let message = match result.effective_at {
            Some(at) => format!(
                "Subscription will be canceled at the end of the current period ({})",
                at.as_datetime().format("%Y-%m-%d")
            ),
            None => "Subscription will be canceled at the end of the current period".to_string(),
        };

        Self {
            success: true,
            message,
            subscription: SubscriptionSummary::from_state(&result.artisan.subscription),
        }
    }
}

/// Body of `GET /api/artisans/me/subscription`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub artisan_id: String,
    pub plan: String,
    pub is_premium: bool,
    /// Euros per month.
    pub monthly_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium_start_date: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium_end_date: Option<Timestamp>,
    pub subscription: Option<SubscriptionSummary>,
}

impl From<GetSubscriptionResult> for SubscriptionResponse {
    fn from(result: GetSubscriptionResult) -> Self {
        Self {
            artisan_id: result.artisan_id.to_string(),
            plan: result.subscription.current_plan.as_str().to_string(),
            is_premium: result.premium.is_premium,
            monthly_price: result.subscription.monthly_price.as_major(),
            premium_type: result.premium.premium_type.map(|t| t.as_str().to_string()),
            premium_start_date: result.premium.premium_start_date,
            premium_end_date: result.premium.premium_end_date,
            subscription: SubscriptionSummary::from_state(&result.subscription),
        }
    }
}

/// Standard error response for API errors.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
