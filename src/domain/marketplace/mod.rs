//! Marketplace domain module.
//!
//! Leads listed for sale to artisans and the purchase guard that keeps
//! `marketplace_sales <= max_sales`.

mod errors;
mod lead;

pub use errors::MarketplaceError;
pub use lead::{Lead, LeadPurchase, LeadStatus, PurchaseRejection};
