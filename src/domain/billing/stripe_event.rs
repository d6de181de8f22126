//! Stripe webhook event types.
//!
//! Only the fields the subscription sync reads are captured; everything else
//! in Stripe's payload is ignored by serde.

use serde::{Deserialize, Serialize};

use crate::domain::artisan::SubscriptionStatus;
use crate::domain::foundation::{Money, SubscriptionId, Timestamp, ValidationError};

use super::reducer::SubscriptionSnapshot;
use super::webhook_errors::WebhookError;

/// Stripe webhook event envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// `evt_...`
    pub id: String,

    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix timestamp of the change that triggered the event.
    pub created: i64,

    pub data: StripeEventData,

    #[serde(default)]
    pub livemode: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// Polymorphic; the event type tells which struct to read it as.
    pub object: serde_json::Value,
}

impl StripeEvent {
    pub fn parsed_type(&self) -> StripeEventType {
        StripeEventType::parse(&self.event_type)
    }

    /// Deserializes `data.object` as the given Stripe object.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(&self) -> Result<T, WebhookError> {
        serde_json::from_value(self.data.object.clone())
            .map_err(|e| WebhookError::ParseError(format!("{}: {}", self.event_type, e)))
    }

    /// The event's creation time, falling back to now if Stripe sent nonsense.
    pub fn created_at(&self) -> Timestamp {
        Timestamp::from_unix_secs(self.created).unwrap_or_else(Timestamp::now)
    }
}

/// Event kinds the subscription sync reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripeEventType {
    CustomerSubscriptionUpdated,
    CustomerSubscriptionDeleted,
    InvoicePaymentSucceeded,
    InvoicePaymentFailed,
    /// Anything else; logged and acknowledged.
    Unknown,
}

impl StripeEventType {
    pub fn parse(s: &str) -> Self {
        match s {
            "customer.subscription.updated" => Self::CustomerSubscriptionUpdated,
            "customer.subscription.deleted" => Self::CustomerSubscriptionDeleted,
            "invoice.payment_succeeded" => Self::InvoicePaymentSucceeded,
            "invoice.payment_failed" => Self::InvoicePaymentFailed,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomerSubscriptionUpdated => "customer.subscription.updated",
            Self::CustomerSubscriptionDeleted => "customer.subscription.deleted",
            Self::InvoicePaymentSucceeded => "invoice.payment_succeeded",
            Self::InvoicePaymentFailed => "invoice.payment_failed",
            Self::Unknown => "unknown",
        }
    }
}

/// Stripe `subscription` object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeSubscription {
    pub id: String,

    #[serde(default)]
    pub customer: Option<String>,

    pub status: String,

    #[serde(default)]
    pub cancel_at_period_end: bool,

    /// Top-level on API versions before 2025-03; per item afterwards.
    #[serde(default)]
    pub current_period_end: Option<i64>,

    #[serde(default)]
    pub items: StripeList<StripeSubscriptionItem>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeList<T> {
    pub data: Vec<T>,
}

impl<T> Default for StripeList<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeSubscriptionItem {
    #[serde(default)]
    pub price: Option<StripePrice>,

    #[serde(default)]
    pub current_period_end: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripePrice {
    pub id: String,

    /// Minor units. Absent for tiered prices.
    #[serde(default)]
    pub unit_amount: Option<i64>,
}

impl StripeSubscription {
    fn first_item(&self) -> Option<&StripeSubscriptionItem> {
        self.items.data.first()
    }

    pub fn unit_amount(&self) -> Money {
        self.first_item()
            .and_then(|item| item.price.as_ref())
            .and_then(|price| price.unit_amount)
            .map(Money::from_cents)
            .unwrap_or(Money::ZERO)
    }

    pub fn period_end(&self) -> Option<Timestamp> {
        self.current_period_end
            .or_else(|| self.first_item().and_then(|item| item.current_period_end))
            .and_then(Timestamp::from_unix_secs)
    }

    /// Converts to the reducer's input, validating id and status.
    pub fn to_snapshot(&self) -> Result<SubscriptionSnapshot, WebhookError> {
        let id = SubscriptionId::new(self.id.clone())
            .map_err(|_| WebhookError::MissingField("subscription.id"))?;
        let status: SubscriptionStatus = self
            .status
            .parse()
            .map_err(|e: ValidationError| WebhookError::ParseError(e.to_string()))?;

        Ok(SubscriptionSnapshot {
            id,
            status,
            unit_amount: self.unit_amount(),
            cancel_at_period_end: self.cancel_at_period_end,
            current_period_end: self.period_end(),
        })
    }
}

/// Stripe `invoice` object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeInvoice {
    pub id: String,

    #[serde(default)]
    pub customer: Option<String>,

    /// Set for subscription invoices on older API versions.
    #[serde(default)]
    pub subscription: Option<String>,

    #[serde(default)]
    pub parent: Option<StripeInvoiceParent>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeInvoiceParent {
    #[serde(default)]
    pub subscription_details: Option<StripeSubscriptionDetails>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeSubscriptionDetails {
    #[serde(default)]
    pub subscription: Option<String>,
}

impl StripeInvoice {
    /// Subscription the invoice bills, if any. One-off invoices have none.
    pub fn subscription_id(&self) -> Option<SubscriptionId> {
        self.subscription
            .clone()
            .or_else(|| {
                self.parent
                    .as_ref()
                    .and_then(|p| p.subscription_details.as_ref())
                    .and_then(|d| d.subscription.clone())
            })
            .and_then(|id| SubscriptionId::new(id).ok())
    }
}

/// Builder for test events.
#[cfg(test)]
pub struct StripeEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
}

#[cfg(test)]
impl StripeEventBuilder {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: event_type.into(),
            created: chrono::Utc::now().timestamp(),
            object: serde_json::json!({}),
        }
    }

    pub fn created(mut self, created: i64) -> Self {
        self.created = created;
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn build(self) -> StripeEvent {
        StripeEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: StripeEventData {
                object: self.object,
            },
            livemode: false,
        }
    }
}
