//! Marketplace handlers.

mod list_leads;
mod purchase_lead;

pub use list_leads::{ListLeadsHandler, ListLeadsQuery, ListLeadsResult, MAX_LISTING_LIMIT};
pub use purchase_lead::{PurchaseLeadCommand, PurchaseLeadHandler, PurchaseLeadResult};
