//! In-memory lead repository.
//!
//! One mutex guards leads and purchases together, so `purchase` is atomic the
//! same way the Postgres transaction is.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{ArtisanId, DomainError, ErrorCode, LeadId, Timestamp};
use crate::domain::marketplace::{Lead, LeadPurchase, PurchaseRejection};
use crate::ports::{LeadRepository, ListingStrategy};

#[derive(Default)]
struct State {
    leads: HashMap<LeadId, Lead>,
    purchases: Vec<LeadPurchase>,
}

#[derive(Default)]
pub struct InMemoryLeadRepository {
    state: Mutex<State>,
}

impl InMemoryLeadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_leads(leads: impl IntoIterator<Item = Lead>) -> Self {
        let repo = Self::new();
        {
            let mut state = repo.state.lock().expect("lead lock poisoned");
            for lead in leads {
                state.leads.insert(lead.id, lead);
            }
        }
        repo
    }

    pub fn get(&self, id: &LeadId) -> Option<Lead> {
        self.state
            .lock()
            .expect("lead lock poisoned")
            .leads
            .get(id)
            .cloned()
    }

    pub fn purchase_count(&self, id: &LeadId) -> usize {
        self.state
            .lock()
            .expect("lead lock poisoned")
            .purchases
            .iter()
            .filter(|p| &p.lead_id == id)
            .count()
    }
}

#[async_trait]
impl LeadRepository for InMemoryLeadRepository {
    async fn save(&self, lead: &Lead) -> Result<(), DomainError> {
        self.state
            .lock()
            .expect("lead lock poisoned")
            .leads
            .insert(lead.id, lead.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &LeadId) -> Result<Option<Lead>, DomainError> {
        Ok(self.get(id))
    }

    async fn purchase(
        &self,
        lead_id: &LeadId,
        artisan_id: &ArtisanId,
    ) -> Result<(Lead, LeadPurchase), DomainError> {
        let mut state = self.state.lock().expect("lead lock poisoned");

        let already = state
            .purchases
            .iter()
            .any(|p| &p.lead_id == lead_id && &p.artisan_id == artisan_id);

        let lead = state.leads.get_mut(lead_id).ok_or_else(|| {
            DomainError::new(ErrorCode::LeadNotFound, format!("Lead not found: {}", lead_id))
        })?;

        if already {
            return Err(PurchaseRejection::AlreadyPurchased.into());
        }

        let purchase = lead.record_sale(*artisan_id, Timestamp::now())?;
        let lead = lead.clone();
        state.purchases.push(purchase.clone());

        Ok((lead, purchase))
    }

    async fn list_available(
        &self,
        strategy: ListingStrategy,
        limit: usize,
    ) -> Result<Vec<Lead>, DomainError> {
        let state = self.state.lock().expect("lead lock poisoned");
        let mut leads: Vec<Lead> = match strategy {
            ListingStrategy::Scan => {
                let mut all: Vec<Lead> = state.leads.values().cloned().collect();
                all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                all.into_iter().filter(Lead::is_listed).collect()
            }
            ListingStrategy::Indexed => {
                let mut listed: Vec<Lead> =
                    state.leads.values().filter(|l| l.is_listed()).cloned().collect();
                listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                listed
            }
        };
        leads.truncate(limit);
        Ok(leads)
    }

    async fn purchases_by_artisan(
        &self,
        artisan_id: &ArtisanId,
    ) -> Result<Vec<LeadPurchase>, DomainError> {
        Ok(self
            .state
            .lock()
            .expect("lead lock poisoned")
            .purchases
            .iter()
            .filter(|p| &p.artisan_id == artisan_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Money;
    use crate::domain::marketplace::LeadStatus;

    fn published(max: i32, sold: i32, created_secs: i64) -> Lead {
        let mut lead = Lead::new(LeadId::new(), "Isolation combles", Money::from_euros(25), max)
            .unwrap();
        lead.publish();
        lead.marketplace_sales = sold;
        lead.created_at = Timestamp::from_unix_secs(created_secs).unwrap();
        lead
    }

    #[tokio::test]
    async fn purchase_records_sale_and_purchase() {
        let lead = published(3, 0, 1);
        let repo = InMemoryLeadRepository::with_leads([lead.clone()]);
        let artisan = ArtisanId::new();

        let (updated, purchase) = repo.purchase(&lead.id, &artisan).await.unwrap();

        assert_eq!(updated.marketplace_sales, 1);
        assert_eq!(purchase.artisan_id, artisan);
        assert_eq!(repo.purchases_by_artisan(&artisan).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn same_artisan_cannot_buy_twice() {
        let lead = published(3, 0, 1);
        let repo = InMemoryLeadRepository::with_leads([lead.clone()]);
        let artisan = ArtisanId::new();
        repo.purchase(&lead.id, &artisan).await.unwrap();

        let err = repo.purchase(&lead.id, &artisan).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::AlreadyPurchased);
        assert_eq!(repo.get(&lead.id).unwrap().marketplace_sales, 1);
    }

    #[tokio::test]
    async fn sold_out_lead_is_rejected() {
        let lead = published(3, 3, 1);
        let repo = InMemoryLeadRepository::with_leads([lead.clone()]);

        let err = repo.purchase(&lead.id, &ArtisanId::new()).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::LeadSoldOut);
    }

    #[tokio::test]
    async fn unknown_lead_is_not_found() {
        let repo = InMemoryLeadRepository::new();
        let err = repo.purchase(&LeadId::new(), &ArtisanId::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::LeadNotFound);
    }

    #[tokio::test]
    async fn both_strategies_list_the_same_leads_newest_first() {
        let old = published(3, 0, 100);
        let new = published(3, 1, 200);
        let full = published(2, 2, 300);
        let mut closed = published(3, 0, 400);
        closed.status = LeadStatus::Closed;
        let mut draft = published(3, 0, 500);
        draft.is_published = false;

        let repo = InMemoryLeadRepository::with_leads([
            old.clone(),
            new.clone(),
            full,
            closed,
            draft,
        ]);

        let scan = repo.list_available(ListingStrategy::Scan, 10).await.unwrap();
        let indexed = repo.list_available(ListingStrategy::Indexed, 10).await.unwrap();

        let ids: Vec<LeadId> = scan.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![new.id, old.id]);
        assert_eq!(scan, indexed);
    }

    #[tokio::test]
    async fn listing_respects_limit() {
        let repo = InMemoryLeadRepository::with_leads([
            published(3, 0, 1),
            published(3, 0, 2),
            published(3, 0, 3),
        ]);

        let leads = repo.list_available(ListingStrategy::Scan, 2).await.unwrap();

        assert_eq!(leads.len(), 2);
    }
}
