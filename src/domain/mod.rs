//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, money, timestamps, errors)
//! - `artisan` - Artisan record, plan tiers and typed patches
//! - `billing` - Stripe webhook verification and the subscription reducer
//! - `marketplace` - Lead sales and the purchase guard

pub mod artisan;
pub mod billing;
pub mod foundation;
pub mod marketplace;
