//! Marketplace lead aggregate.
//!
//! A lead is a homeowner project sold to at most `max_sales` artisans. The
//! guard below is the single place that decides whether one more sale is
//! allowed; repositories call it while holding the row lock so the check and
//! the increment happen as one step.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::foundation::{ArtisanId, LeadId, Money, Timestamp, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    Active,
    /// Sold out or withdrawn. Terminal for the marketplace.
    Closed,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Active => "active",
            LeadStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(LeadStatus::Active),
            "closed" => Ok(LeadStatus::Closed),
            other => Err(ValidationError::invalid_format(
                "lead_status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

/// Why a purchase attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PurchaseRejection {
    #[error("Lead is not published")]
    NotPublished,

    #[error("Lead is no longer active")]
    NotActive,

    #[error("Lead has reached its maximum number of sales")]
    SoldOut,

    #[error("Lead was already purchased by this artisan")]
    AlreadyPurchased,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub title: String,
    pub city: Option<String>,
    /// Price charged to each buying artisan.
    pub price: Money,
    pub max_sales: i32,
    pub marketplace_sales: i32,
    pub is_published: bool,
    pub status: LeadStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Lead {
    /// Creates an unpublished, active lead.
    pub fn new(
        id: LeadId,
        title: impl Into<String>,
        price: Money,
        max_sales: i32,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::empty_field("title"));
        }
        if max_sales < 1 {
            return Err(ValidationError::invalid_format(
                "max_sales",
                "must allow at least one sale",
            ));
        }
        if price.cents() < 0 {
            return Err(ValidationError::invalid_format("price", "cannot be negative"));
        }

        let now = Timestamp::now();
        Ok(Self {
            id,
            title,
            city: None,
            price,
            max_sales,
            marketplace_sales: 0,
            is_published: false,
            status: LeadStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn publish(&mut self) {
        self.is_published = true;
    }

    pub fn remaining_sales(&self) -> i32 {
        (self.max_sales - self.marketplace_sales).max(0)
    }

    /// Whether the lead belongs in the marketplace listing.
    pub fn is_listed(&self) -> bool {
        self.is_published && self.status == LeadStatus::Active && self.remaining_sales() > 0
    }

    /// Checks the lead side of the purchase guard without mutating.
    pub fn ensure_purchasable(&self) -> Result<(), PurchaseRejection> {
        if !self.is_published {
            return Err(PurchaseRejection::NotPublished);
        }
        if self.marketplace_sales >= self.max_sales {
            return Err(PurchaseRejection::SoldOut);
        }
        if self.status != LeadStatus::Active {
            return Err(PurchaseRejection::NotActive);
        }
        Ok(())
    }

    /// Records one sale, closing the lead when the last slot is taken.
    pub fn record_sale(
        &mut self,
        artisan_id: ArtisanId,
        now: Timestamp,
    ) -> Result<LeadPurchase, PurchaseRejection> {
        self.ensure_purchasable()?;

        self.marketplace_sales += 1;
        if self.marketplace_sales >= self.max_sales {
            self.status = LeadStatus::Closed;
        }
        self.updated_at = now;

        Ok(LeadPurchase {
            lead_id: self.id,
            artisan_id,
            price: self.price,
            purchased_at: now,
        })
    }
}

/// A completed lead sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadPurchase {
    pub lead_id: LeadId,
    pub artisan_id: ArtisanId,
    pub price: Money,
    pub purchased_at: Timestamp,
}
