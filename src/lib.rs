//! Portail Habitat - billing synchronization and lead marketplace backend.
//!
//! Keeps artisan records in step with their Stripe subscriptions (webhooks and
//! self-service cancellation) and sells marketplace leads without overselling.
//!
//! Layout follows a ports-and-adapters split:
//!
//! - `domain` - Artisans, the subscription reducer, leads and the purchase guard
//! - `ports` - Traits for persistence, billing and identity
//! - `application` - Command and query handlers
//! - `adapters` - PostgreSQL, Stripe, Firebase, in-memory and HTTP
//! - `config` - Environment-driven configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
