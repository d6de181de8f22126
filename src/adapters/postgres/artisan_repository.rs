//! PostgreSQL implementation of ArtisanRepository.
//!
//! Updates are guarded by the `version` column: a write succeeds only if the
//! stored version still matches the one the caller read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::artisan::{
    Artisan, PlanTier, PremiumFeatures, PremiumType, SubscriptionState, SubscriptionStatus,
};
use crate::domain::foundation::{
    ArtisanId, DomainError, ErrorCode, Money, SubscriptionId, Timestamp, UserId,
};
use crate::ports::ArtisanRepository;

const SELECT_COLUMNS: &str = r#"
    SELECT id, owner_id, company_name, stripe_customer_id, stripe_subscription_id,
           subscription_status, current_plan, monthly_price_cents, current_period_end,
           cancel_at_period_end, is_premium, premium_type, premium_start_date,
           premium_end_date, banner_photos, show_top_artisan_badge, version,
           created_at, updated_at
    FROM artisans
"#;

pub struct PostgresArtisanRepository {
    pool: PgPool,
}

impl PostgresArtisanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        predicate: &str,
        value: &str,
    ) -> Result<Option<Artisan>, DomainError> {
        let sql = format!("{} WHERE {} = $1", SELECT_COLUMNS, predicate);
        let row: Option<ArtisanRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to find artisan: {}", e)))?;

        row.map(Artisan::try_from).transpose()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ArtisanRow {
    id: Uuid,
    owner_id: String,
    company_name: String,
    stripe_customer_id: Option<String>,
    stripe_subscription_id: Option<String>,
    subscription_status: Option<String>,
    current_plan: String,
    monthly_price_cents: i64,
    current_period_end: Option<DateTime<Utc>>,
    cancel_at_period_end: bool,
    is_premium: bool,
    premium_type: Option<String>,
    premium_start_date: Option<DateTime<Utc>>,
    premium_end_date: Option<DateTime<Utc>>,
    banner_photos: Vec<String>,
    show_top_artisan_badge: bool,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ArtisanRow> for Artisan {
    type Error = DomainError;

    fn try_from(row: ArtisanRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, e: String| {
            DomainError::database(format!("Invalid {} for artisan {}: {}", field, row.id, e))
        };

        let status = row
            .subscription_status
            .as_deref()
            .map(|s| s.parse::<SubscriptionStatus>())
            .transpose()
            .map_err(|e| corrupt("subscription_status", e.to_string()))?;
        let current_plan: PlanTier = row
            .current_plan
            .parse()
            .map_err(|e: crate::domain::foundation::ValidationError| {
                corrupt("current_plan", e.to_string())
            })?;
        let premium_type = match row.premium_type.as_deref() {
            None => None,
            Some("monthly") => Some(PremiumType::Monthly),
            Some(other) => return Err(corrupt("premium_type", other.to_string())),
        };
        let owner_id =
            UserId::new(row.owner_id.clone()).map_err(|e| corrupt("owner_id", e.to_string()))?;
        let stripe_subscription_id = row
            .stripe_subscription_id
            .clone()
            .map(SubscriptionId::new)
            .transpose()
            .map_err(|e| corrupt("stripe_subscription_id", e.to_string()))?;

        Ok(Artisan {
            id: ArtisanId::from_uuid(row.id),
            owner_id,
            company_name: row.company_name,
            stripe_customer_id: row.stripe_customer_id,
            subscription: SubscriptionState {
                stripe_subscription_id,
                status,
                current_plan,
                monthly_price: Money::from_cents(row.monthly_price_cents),
                current_period_end: row.current_period_end.map(Timestamp::from_datetime),
                cancel_at_period_end: row.cancel_at_period_end,
            },
            premium: PremiumFeatures {
                is_premium: row.is_premium,
                premium_type,
                premium_start_date: row.premium_start_date.map(Timestamp::from_datetime),
                premium_end_date: row.premium_end_date.map(Timestamp::from_datetime),
                banner_photos: row.banner_photos,
                show_top_artisan_badge: row.show_top_artisan_badge,
            },
            version: row.version,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl ArtisanRepository for PostgresArtisanRepository {
    async fn save(&self, artisan: &Artisan) -> Result<(), DomainError> {
        let sub = &artisan.subscription;
        let premium = &artisan.premium;

        sqlx::query(
            r#"
            INSERT INTO artisans (
                id, owner_id, company_name, stripe_customer_id, stripe_subscription_id,
                subscription_status, current_plan, monthly_price_cents, current_period_end,
                cancel_at_period_end, is_premium, premium_type, premium_start_date,
                premium_end_date, banner_photos, show_top_artisan_badge, version,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(artisan.id.as_uuid())
        .bind(artisan.owner_id.as_str())
        .bind(&artisan.company_name)
        .bind(&artisan.stripe_customer_id)
        .bind(sub.stripe_subscription_id.as_ref().map(|s| s.as_str()))
        .bind(sub.status.map(|s| s.as_str()))
        .bind(sub.current_plan.as_str())
        .bind(sub.monthly_price.cents())
        .bind(sub.current_period_end.map(|t| *t.as_datetime()))
        .bind(sub.cancel_at_period_end)
        .bind(premium.is_premium)
        .bind(premium.premium_type.map(|t| t.as_str()))
        .bind(premium.premium_start_date.map(|t| *t.as_datetime()))
        .bind(premium.premium_end_date.map(|t| *t.as_datetime()))
        .bind(&premium.banner_photos)
        .bind(premium.show_top_artisan_badge)
        .bind(artisan.version)
        .bind(artisan.created_at.as_datetime())
        .bind(artisan.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("artisans_owner_id_key") {
                    return DomainError::validation(
                        "owner_id",
                        "Owner already has an artisan record",
                    );
                }
            }
            DomainError::database(format!("Failed to save artisan: {}", e))
        })?;

        Ok(())
    }

    async fn update(&self, artisan: &Artisan) -> Result<(), DomainError> {
        let sub = &artisan.subscription;
        let premium = &artisan.premium;

        let result = sqlx::query(
            r#"
            UPDATE artisans SET
                company_name = $3,
                stripe_customer_id = $4,
                stripe_subscription_id = $5,
                subscription_status = $6,
                current_plan = $7,
                monthly_price_cents = $8,
                current_period_end = $9,
                cancel_at_period_end = $10,
                is_premium = $11,
                premium_type = $12,
                premium_start_date = $13,
                premium_end_date = $14,
                banner_photos = $15,
                show_top_artisan_badge = $16,
                updated_at = $17,
                version = version + 1
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(artisan.id.as_uuid())
        .bind(artisan.version)
        .bind(&artisan.company_name)
        .bind(&artisan.stripe_customer_id)
        .bind(sub.stripe_subscription_id.as_ref().map(|s| s.as_str()))
        .bind(sub.status.map(|s| s.as_str()))
        .bind(sub.current_plan.as_str())
        .bind(sub.monthly_price.cents())
        .bind(sub.current_period_end.map(|t| *t.as_datetime()))
        .bind(sub.cancel_at_period_end)
        .bind(premium.is_premium)
        .bind(premium.premium_type.map(|t| t.as_str()))
        .bind(premium.premium_start_date.map(|t| *t.as_datetime()))
        .bind(premium.premium_end_date.map(|t| *t.as_datetime()))
        .bind(&premium.banner_photos)
        .bind(premium.show_top_artisan_badge)
        .bind(artisan.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update artisan: {}", e)))?;

        if result.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM artisans WHERE id = $1)")
                    .bind(artisan.id.as_uuid())
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| {
                        DomainError::database(format!("Failed to check artisan: {}", e))
                    })?;

            return Err(if exists {
                DomainError::new(
                    ErrorCode::ConcurrencyConflict,
                    format!("Artisan {} was modified concurrently", artisan.id),
                )
            } else {
                DomainError::new(
                    ErrorCode::ArtisanNotFound,
                    format!("Artisan not found: {}", artisan.id),
                )
            });
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &ArtisanId) -> Result<Option<Artisan>, DomainError> {
        let sql = format!("{} WHERE id = $1", SELECT_COLUMNS);
        let row: Option<ArtisanRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to find artisan: {}", e)))?;

        row.map(Artisan::try_from).transpose()
    }

    async fn find_by_owner(&self, owner_id: &UserId) -> Result<Option<Artisan>, DomainError> {
        self.fetch_one_where("owner_id", owner_id.as_str()).await
    }

    async fn find_by_subscription_id(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<Option<Artisan>, DomainError> {
        self.fetch_one_where("stripe_subscription_id", subscription_id.as_str())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ArtisanRow {
        let now = Utc::now();
        ArtisanRow {
            id: Uuid::new_v4(),
            owner_id: "uid-1".to_string(),
            company_name: "Menuiserie Durand".to_string(),
            stripe_customer_id: Some("cus_1".to_string()),
            stripe_subscription_id: Some("sub_1".to_string()),
            subscription_status: Some("past_due".to_string()),
            current_plan: "premium_plus".to_string(),
            monthly_price_cents: 19_900,
            current_period_end: Some(now),
            cancel_at_period_end: false,
            is_premium: false,
            premium_type: Some("monthly".to_string()),
            premium_start_date: Some(now),
            premium_end_date: None,
            banner_photos: vec!["hero.jpg".to_string()],
            show_top_artisan_badge: true,
            version: 4,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn row_converts_to_artisan() {
        let artisan = Artisan::try_from(row()).unwrap();

        assert_eq!(artisan.subscription.status, Some(SubscriptionStatus::PastDue));
        assert_eq!(artisan.subscription.current_plan, PlanTier::PremiumPlus);
        assert_eq!(artisan.subscription.monthly_price, Money::from_cents(19_900));
        assert_eq!(
            artisan.subscription.stripe_subscription_id,
            Some(SubscriptionId::new("sub_1").unwrap())
        );
        assert_eq!(artisan.premium.premium_type, Some(PremiumType::Monthly));
        assert_eq!(artisan.version, 4);
    }

    #[test]
    fn unknown_stored_status_is_a_database_error() {
        let mut bad = row();
        bad.subscription_status = Some("exploded".to_string());

        let err = Artisan::try_from(bad).unwrap_err();

        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn never_subscribed_artisan_has_no_status() {
        let mut fresh = row();
        fresh.subscription_status = None;
        fresh.stripe_subscription_id = None;

        let artisan = Artisan::try_from(fresh).unwrap();

        assert!(artisan.subscription.status.is_none());
        assert!(artisan.subscription.stripe_subscription_id.is_none());
    }
}
