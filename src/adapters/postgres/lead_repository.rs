//! PostgreSQL implementation of LeadRepository.
//!
//! # Purchases
//!
//! `purchase` runs in one transaction: the lead row is locked with
//! `SELECT ... FOR UPDATE`, the guard runs on the locked copy, and the counter
//! update plus the purchase insert commit together. Two buyers racing for the
//! last slot serialize on the row lock; the second sees the closed lead.
//!
//! # Listing strategies
//!
//! - `Scan` walks `created_at DESC` pages over the single-column index and
//!   filters in Rust. No compound index needed; cost grows with the number of
//!   unlisted leads ahead of the listed ones.
//! - `Indexed` pushes every predicate into SQL and relies on
//!   `leads_marketplace_idx (is_published, status, created_at DESC)`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    ArtisanId, DomainError, ErrorCode, LeadId, Money, Timestamp, ValidationError,
};
use crate::domain::marketplace::{Lead, LeadPurchase, LeadStatus, PurchaseRejection};
use crate::ports::{LeadRepository, ListingStrategy};

/// Rows fetched per round trip by the scan strategy.
const SCAN_PAGE_SIZE: i64 = 200;

const LEAD_COLUMNS: &str = "id, title, city, price_cents, max_sales, marketplace_sales, \
     is_published, status, created_at, updated_at";

pub struct PostgresLeadRepository {
    pool: PgPool,
}

impl PostgresLeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn scan(&self, limit: usize) -> Result<Vec<Lead>, DomainError> {
        let mut listed = Vec::with_capacity(limit);
        let mut cursor: Option<(DateTime<Utc>, Uuid)> = None;
        let first_page = format!(
            "SELECT {} FROM leads ORDER BY created_at DESC, id DESC LIMIT $1",
            LEAD_COLUMNS
        );
        let next_page = format!(
            "SELECT {} FROM leads WHERE (created_at, id) < ($1, $2) \
             ORDER BY created_at DESC, id DESC LIMIT $3",
            LEAD_COLUMNS
        );

        loop {
            let rows: Vec<LeadRow> = match cursor {
                None => {
                    sqlx::query_as(&first_page)
                        .bind(SCAN_PAGE_SIZE)
                        .fetch_all(&self.pool)
                        .await
                }
                Some((created_at, id)) => {
                    sqlx::query_as(&next_page)
                        .bind(created_at)
                        .bind(id)
                        .bind(SCAN_PAGE_SIZE)
                        .fetch_all(&self.pool)
                        .await
                }
            }
            .map_err(|e| DomainError::database(format!("Failed to scan leads: {}", e)))?;

            let exhausted = (rows.len() as i64) < SCAN_PAGE_SIZE;
            cursor = rows.last().map(|r| (r.created_at, r.id));

            for row in rows {
                let lead = Lead::try_from(row)?;
                if lead.is_listed() {
                    listed.push(lead);
                    if listed.len() == limit {
                        return Ok(listed);
                    }
                }
            }

            if exhausted {
                return Ok(listed);
            }
        }
    }

    async fn indexed(&self, limit: usize) -> Result<Vec<Lead>, DomainError> {
        let rows: Vec<LeadRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM leads
            WHERE is_published = TRUE
              AND status = 'active'
              AND marketplace_sales < max_sales
            ORDER BY created_at DESC
            LIMIT $1
            "#,
            LEAD_COLUMNS
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list leads: {}", e)))?;

        rows.into_iter().map(Lead::try_from).collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LeadRow {
    id: Uuid,
    title: String,
    city: Option<String>,
    price_cents: i64,
    max_sales: i32,
    marketplace_sales: i32,
    is_published: bool,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LeadRow> for Lead {
    type Error = DomainError;

    fn try_from(row: LeadRow) -> Result<Self, Self::Error> {
        let status: LeadStatus = row.status.parse().map_err(|e: ValidationError| {
            DomainError::database(format!("Invalid status for lead {}: {}", row.id, e))
        })?;

        Ok(Lead {
            id: LeadId::from_uuid(row.id),
            title: row.title,
            city: row.city,
            price: Money::from_cents(row.price_cents),
            max_sales: row.max_sales,
            marketplace_sales: row.marketplace_sales,
            is_published: row.is_published,
            status,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    lead_id: Uuid,
    artisan_id: Uuid,
    price_cents: i64,
    purchased_at: DateTime<Utc>,
}

impl From<PurchaseRow> for LeadPurchase {
    fn from(row: PurchaseRow) -> Self {
        LeadPurchase {
            lead_id: LeadId::from_uuid(row.lead_id),
            artisan_id: ArtisanId::from_uuid(row.artisan_id),
            price: Money::from_cents(row.price_cents),
            purchased_at: Timestamp::from_datetime(row.purchased_at),
        }
    }
}

#[async_trait]
impl LeadRepository for PostgresLeadRepository {
    async fn save(&self, lead: &Lead) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO leads (
                id, title, city, price_cents, max_sales, marketplace_sales,
                is_published, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                city = EXCLUDED.city,
                price_cents = EXCLUDED.price_cents,
                max_sales = EXCLUDED.max_sales,
                is_published = EXCLUDED.is_published,
                status = EXCLUDED.status,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(lead.id.as_uuid())
        .bind(&lead.title)
        .bind(&lead.city)
        .bind(lead.price.cents())
        .bind(lead.max_sales)
        .bind(lead.marketplace_sales)
        .bind(lead.is_published)
        .bind(lead.status.as_str())
        .bind(lead.created_at.as_datetime())
        .bind(lead.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to save lead: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &LeadId) -> Result<Option<Lead>, DomainError> {
        let row: Option<LeadRow> =
            sqlx::query_as(&format!("SELECT {} FROM leads WHERE id = $1", LEAD_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::database(format!("Failed to find lead: {}", e)))?;

        row.map(Lead::try_from).transpose()
    }

    async fn purchase(
        &self,
        lead_id: &LeadId,
        artisan_id: &ArtisanId,
    ) -> Result<(Lead, LeadPurchase), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database(format!("Failed to begin transaction: {}", e)))?;

        let row: Option<LeadRow> = sqlx::query_as(&format!(
            "SELECT {} FROM leads WHERE id = $1 FOR UPDATE",
            LEAD_COLUMNS
        ))
        .bind(lead_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to lock lead: {}", e)))?;

        let mut lead = match row {
            Some(row) => Lead::try_from(row)?,
            None => {
                return Err(DomainError::new(
                    ErrorCode::LeadNotFound,
                    format!("Lead not found: {}", lead_id),
                ))
            }
        };

        let already: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM lead_purchases WHERE lead_id = $1 AND artisan_id = $2)",
        )
        .bind(lead_id.as_uuid())
        .bind(artisan_id.as_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to check purchases: {}", e)))?;

        if already {
            return Err(PurchaseRejection::AlreadyPurchased.into());
        }

        // Dropping `tx` on an early return rolls back and releases the lock.
        let purchase = lead.record_sale(*artisan_id, Timestamp::now())?;

        sqlx::query(
            r#"
            UPDATE leads SET
                marketplace_sales = $2,
                status = $3,
                updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(lead.id.as_uuid())
        .bind(lead.marketplace_sales)
        .bind(lead.status.as_str())
        .bind(lead.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update lead: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO lead_purchases (lead_id, artisan_id, price_cents, purchased_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(purchase.lead_id.as_uuid())
        .bind(purchase.artisan_id.as_uuid())
        .bind(purchase.price.cents())
        .bind(purchase.purchased_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("lead_purchases_pkey") {
                    return DomainError::from(PurchaseRejection::AlreadyPurchased);
                }
            }
            DomainError::database(format!("Failed to record purchase: {}", e))
        })?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database(format!("Failed to commit purchase: {}", e)))?;

        Ok((lead, purchase))
    }

    async fn list_available(
        &self,
        strategy: ListingStrategy,
        limit: usize,
    ) -> Result<Vec<Lead>, DomainError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        match strategy {
            ListingStrategy::Scan => self.scan(limit).await,
            ListingStrategy::Indexed => self.indexed(limit).await,
        }
    }

    async fn purchases_by_artisan(
        &self,
        artisan_id: &ArtisanId,
    ) -> Result<Vec<LeadPurchase>, DomainError> {
        let rows: Vec<PurchaseRow> = sqlx::query_as(
            r#"
            SELECT lead_id, artisan_id, price_cents, purchased_at
            FROM lead_purchases
            WHERE artisan_id = $1
            ORDER BY purchased_at DESC
            "#,
        )
        .bind(artisan_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list purchases: {}", e)))?;

        Ok(rows.into_iter().map(LeadPurchase::from).collect())
    }
}
