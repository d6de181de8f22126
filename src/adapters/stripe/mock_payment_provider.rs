//! Mock payment provider for tests.
//!
//! Holds subscriptions in memory, records calls, and can be told to fail a
//! given method.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::artisan::SubscriptionStatus;
use crate::domain::foundation::SubscriptionId;
use crate::ports::{PaymentError, PaymentErrorCode, PaymentProvider, ProviderSubscription};

#[derive(Default)]
struct MockState {
    subscriptions: HashMap<SubscriptionId, ProviderSubscription>,
    method_errors: HashMap<String, PaymentError>,
    call_log: Vec<MethodCall>,
}

/// Recorded call for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub method: String,
    pub subscription_id: String,
}

#[derive(Default, Clone)]
pub struct MockPaymentProvider {
    inner: Arc<Mutex<MockState>>,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_subscription(&self, subscription: ProviderSubscription) {
        self.inner
            .lock()
            .expect("mock lock poisoned")
            .subscriptions
            .insert(subscription.id.clone(), subscription);
    }

    /// Every later call to `method` returns `error`.
    pub fn set_method_error(&self, method: &str, error: PaymentError) {
        self.inner
            .lock()
            .expect("mock lock poisoned")
            .method_errors
            .insert(method.to_string(), error);
    }

    pub fn calls(&self) -> Vec<MethodCall> {
        self.inner.lock().expect("mock lock poisoned").call_log.clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls().iter().filter(|c| c.method == method).count()
    }

    fn record(&self, method: &str, id: &SubscriptionId) -> Result<(), PaymentError> {
        let mut state = self.inner.lock().expect("mock lock poisoned");
        state.call_log.push(MethodCall {
            method: method.to_string(),
            subscription_id: id.to_string(),
        });
        match state.method_errors.get(method) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn get_subscription(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<Option<ProviderSubscription>, PaymentError> {
        self.record("get_subscription", subscription_id)?;
        Ok(self
            .inner
            .lock()
            .expect("mock lock poisoned")
            .subscriptions
            .get(subscription_id)
            .cloned())
    }

    async fn cancel_at_period_end(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<ProviderSubscription, PaymentError> {
        self.record("cancel_at_period_end", subscription_id)?;
        let mut state = self.inner.lock().expect("mock lock poisoned");
        let sub = state
            .subscriptions
            .get_mut(subscription_id)
            .ok_or_else(|| PaymentError::not_found("subscription"))?;
        if sub.status == SubscriptionStatus::Canceled {
            return Err(PaymentError::new(
                PaymentErrorCode::InvalidRequest,
                "subscription is already canceled",
            ));
        }
        // Stripe keeps the status active until the period actually ends.
        sub.cancel_at_period_end = true;
        Ok(sub.clone())
    }
}
