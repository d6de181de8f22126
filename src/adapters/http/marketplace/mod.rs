//! HTTP adapter for the lead marketplace.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::MarketplaceAppState;
pub use routes::marketplace_router;
