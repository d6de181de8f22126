//! PostgreSQL implementation of SubscriptionMirrorRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::artisan::{PlanTier, SubscriptionPatch, SubscriptionStatus};
use crate::domain::billing::SubscriptionRecord;
use crate::domain::foundation::{
    ArtisanId, DomainError, Money, SubscriptionId, Timestamp, ValidationError,
};
use crate::ports::SubscriptionMirrorRepository;

pub struct PostgresSubscriptionMirror {
    pool: PgPool,
}

impl PostgresSubscriptionMirror {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    subscription_id: String,
    artisan_id: Uuid,
    stripe_customer_id: Option<String>,
    status: String,
    plan: String,
    monthly_price_cents: i64,
    current_period_end: Option<DateTime<Utc>>,
    cancel_at_period_end: bool,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for SubscriptionRecord {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let corrupt = |e: ValidationError| {
            DomainError::database(format!("Invalid subscription row: {}", e))
        };

        Ok(SubscriptionRecord {
            subscription_id: SubscriptionId::new(row.subscription_id).map_err(corrupt)?,
            artisan_id: ArtisanId::from_uuid(row.artisan_id),
            stripe_customer_id: row.stripe_customer_id,
            status: row.status.parse::<SubscriptionStatus>().map_err(corrupt)?,
            plan: row.plan.parse::<PlanTier>().map_err(corrupt)?,
            monthly_price: Money::from_cents(row.monthly_price_cents),
            current_period_end: row.current_period_end.map(Timestamp::from_datetime),
            cancel_at_period_end: row.cancel_at_period_end,
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl SubscriptionMirrorRepository for PostgresSubscriptionMirror {
    async fn upsert(&self, record: &SubscriptionRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                subscription_id, artisan_id, stripe_customer_id, status, plan,
                monthly_price_cents, current_period_end, cancel_at_period_end, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (subscription_id) DO UPDATE SET
                artisan_id = EXCLUDED.artisan_id,
                stripe_customer_id = EXCLUDED.stripe_customer_id,
                status = EXCLUDED.status,
                plan = EXCLUDED.plan,
                monthly_price_cents = EXCLUDED.monthly_price_cents,
                current_period_end = EXCLUDED.current_period_end,
                cancel_at_period_end = EXCLUDED.cancel_at_period_end,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(record.subscription_id.as_str())
        .bind(record.artisan_id.as_uuid())
        .bind(&record.stripe_customer_id)
        .bind(record.status.as_str())
        .bind(record.plan.as_str())
        .bind(record.monthly_price.cents())
        .bind(record.current_period_end.map(|t| *t.as_datetime()))
        .bind(record.cancel_at_period_end)
        .bind(record.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to upsert subscription: {}", e)))?;

        Ok(())
    }

    async fn apply(
        &self,
        subscription_id: &SubscriptionId,
        patch: &SubscriptionPatch,
    ) -> Result<bool, DomainError> {
        // NULL parameters leave the column as it is.
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                status = COALESCE($2, status),
                plan = COALESCE($3, plan),
                monthly_price_cents = COALESCE($4, monthly_price_cents),
                current_period_end = COALESCE($5, current_period_end),
                cancel_at_period_end = COALESCE($6, cancel_at_period_end),
                updated_at = $7
            WHERE subscription_id = $1
            "#,
        )
        .bind(subscription_id.as_str())
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.current_plan.map(|p| p.as_str()))
        .bind(patch.monthly_price.map(|m| m.cents()))
        .bind(patch.current_period_end.map(|t| *t.as_datetime()))
        .bind(patch.cancel_at_period_end)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update subscription: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT subscription_id, artisan_id, stripe_customer_id, status, plan,
                   monthly_price_cents, current_period_end, cancel_at_period_end, updated_at
            FROM subscriptions
            WHERE subscription_id = $1
            "#,
        )
        .bind(subscription_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find subscription: {}", e)))?;

        row.map(SubscriptionRecord::try_from).transpose()
    }
}
