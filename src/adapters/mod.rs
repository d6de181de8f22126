//! Adapters - Implementations of port interfaces.
//!
//! - `auth` - Firebase ID token validation
//! - `http` - axum routers, DTOs and auth middleware
//! - `memory` - In-memory repositories for tests and local runs
//! - `postgres` - sqlx repositories
//! - `stripe` - Stripe REST client and a mock provider

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;
