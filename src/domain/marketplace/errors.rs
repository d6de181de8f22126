//! Marketplace errors.
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | LeadNotFound | 404 |
//! | ArtisanNotFoundForUser | 404 |
//! | Rejected | 409 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, LeadId, UserId};

use super::PurchaseRejection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketplaceError {
    LeadNotFound(LeadId),

    ArtisanNotFoundForUser(UserId),

    /// The purchase guard refused the sale.
    Rejected(PurchaseRejection),

    Infrastructure(String),
}

impl MarketplaceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            MarketplaceError::LeadNotFound(_) => ErrorCode::LeadNotFound,
            MarketplaceError::ArtisanNotFoundForUser(_) => ErrorCode::ArtisanNotFound,
            MarketplaceError::Rejected(r) => match r {
                PurchaseRejection::NotPublished => ErrorCode::LeadNotPublished,
                PurchaseRejection::NotActive => ErrorCode::LeadNotActive,
                PurchaseRejection::SoldOut => ErrorCode::LeadSoldOut,
                PurchaseRejection::AlreadyPurchased => ErrorCode::AlreadyPurchased,
            },
            MarketplaceError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            MarketplaceError::LeadNotFound(id) => format!("Lead not found: {}", id),
            MarketplaceError::ArtisanNotFoundForUser(_) => "Artisan not found".to_string(),
            MarketplaceError::Rejected(r) => r.to_string(),
            MarketplaceError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for MarketplaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for MarketplaceError {}

impl From<PurchaseRejection> for MarketplaceError {
    fn from(rejection: PurchaseRejection) -> Self {
        MarketplaceError::Rejected(rejection)
    }
}

impl From<PurchaseRejection> for DomainError {
    fn from(rejection: PurchaseRejection) -> Self {
        let err = MarketplaceError::Rejected(rejection);
        DomainError::new(err.code(), err.message())
    }
}

impl From<DomainError> for MarketplaceError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::LeadSoldOut => MarketplaceError::Rejected(PurchaseRejection::SoldOut),
            ErrorCode::LeadNotActive => MarketplaceError::Rejected(PurchaseRejection::NotActive),
            ErrorCode::LeadNotPublished => {
                MarketplaceError::Rejected(PurchaseRejection::NotPublished)
            }
            ErrorCode::AlreadyPurchased => {
                MarketplaceError::Rejected(PurchaseRejection::AlreadyPurchased)
            }
            _ => MarketplaceError::Infrastructure(err.to_string()),
        }
    }
}
