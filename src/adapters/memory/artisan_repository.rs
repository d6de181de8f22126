//! In-memory artisan repository.
//!
//! Used by tests and by local runs without a database. Lock poisoning panics,
//! which is acceptable here and is why this adapter is never wired in
//! production.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::artisan::Artisan;
use crate::domain::foundation::{
    ArtisanId, DomainError, ErrorCode, SubscriptionId, UserId,
};
use crate::ports::ArtisanRepository;

#[derive(Default)]
pub struct InMemoryArtisanRepository {
    artisans: RwLock<HashMap<ArtisanId, Artisan>>,
    writes: AtomicUsize,
    fail_updates: AtomicBool,
}

impl InMemoryArtisanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_artisans(artisans: impl IntoIterator<Item = Artisan>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.artisans.write().expect("artisan lock poisoned");
            for artisan in artisans {
                map.insert(artisan.id, artisan);
            }
        }
        repo
    }

    /// Makes every subsequent `update` fail with a database error.
    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }

    /// Number of successful `save`/`update` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn get(&self, id: &ArtisanId) -> Option<Artisan> {
        self.artisans
            .read()
            .expect("artisan lock poisoned")
            .get(id)
            .cloned()
    }

    fn find_where(&self, pred: impl Fn(&Artisan) -> bool) -> Option<Artisan> {
        self.artisans
            .read()
            .expect("artisan lock poisoned")
            .values()
            .find(|a| pred(a))
            .cloned()
    }
}

#[async_trait]
impl ArtisanRepository for InMemoryArtisanRepository {
    async fn save(&self, artisan: &Artisan) -> Result<(), DomainError> {
        let mut map = self.artisans.write().expect("artisan lock poisoned");
        if map.values().any(|a| a.owner_id == artisan.owner_id) {
            return Err(DomainError::validation(
                "owner_id",
                "Owner already has an artisan record",
            ));
        }
        map.insert(artisan.id, artisan.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update(&self, artisan: &Artisan) -> Result<(), DomainError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(DomainError::database("simulated artisan write failure"));
        }

        let mut map = self.artisans.write().expect("artisan lock poisoned");
        let stored = map.get_mut(&artisan.id).ok_or_else(|| {
            DomainError::new(
                ErrorCode::ArtisanNotFound,
                format!("Artisan not found: {}", artisan.id),
            )
        })?;

        if stored.version != artisan.version {
            return Err(DomainError::new(
                ErrorCode::ConcurrencyConflict,
                format!("Artisan {} was modified concurrently", artisan.id),
            ));
        }

        let mut next = artisan.clone();
        next.version += 1;
        *stored = next;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn find_by_id(&self, id: &ArtisanId) -> Result<Option<Artisan>, DomainError> {
        Ok(self.get(id))
    }

    async fn find_by_owner(&self, owner_id: &UserId) -> Result<Option<Artisan>, DomainError> {
        Ok(self.find_where(|a| &a.owner_id == owner_id))
    }

    async fn find_by_subscription_id(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<Option<Artisan>, DomainError> {
        Ok(self.find_where(|a| {
            a.subscription.stripe_subscription_id.as_ref() == Some(subscription_id)
        }))
    }
}
