//! In-memory mirrored subscription records.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::artisan::SubscriptionPatch;
use crate::domain::billing::SubscriptionRecord;
use crate::domain::foundation::{DomainError, SubscriptionId, Timestamp};
use crate::ports::SubscriptionMirrorRepository;

#[derive(Default)]
pub struct InMemorySubscriptionMirror {
    records: RwLock<HashMap<SubscriptionId, SubscriptionRecord>>,
    writes: AtomicUsize,
    failing: AtomicBool,
}

impl InMemorySubscriptionMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mirror whose every call errors, for isolation tests.
    pub fn failing() -> Self {
        let mirror = Self::new();
        mirror.failing.store(true, Ordering::SeqCst);
        mirror
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn get(&self, id: &SubscriptionId) -> Option<SubscriptionRecord> {
        self.records
            .read()
            .expect("mirror lock poisoned")
            .get(id)
            .cloned()
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::database("simulated mirror failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriptionMirrorRepository for InMemorySubscriptionMirror {
    async fn upsert(&self, record: &SubscriptionRecord) -> Result<(), DomainError> {
        self.check()?;
        self.records
            .write()
            .expect("mirror lock poisoned")
            .insert(record.subscription_id.clone(), record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn apply(
        &self,
        subscription_id: &SubscriptionId,
        patch: &SubscriptionPatch,
    ) -> Result<bool, DomainError> {
        self.check()?;
        let mut records = self.records.write().expect("mirror lock poisoned");
        match records.get_mut(subscription_id) {
            Some(record) => {
                record.apply(patch, Timestamp::now());
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        self.check()?;
        Ok(self.get(subscription_id))
    }
}
