//! HTTP adapters - REST API implementations.
//!
//! Each feature has its own router and state; `router::build_router` mounts
//! them under `/api` behind the auth middleware.

pub mod billing;
pub mod marketplace;
pub mod middleware;
pub mod router;

pub use billing::BillingAppState;
pub use marketplace::MarketplaceAppState;
pub use router::{build_router, ApiState};
