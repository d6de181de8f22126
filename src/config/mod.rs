//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `PORTAIL_HABITAT`
//! prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use portail_habitat::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod database;
mod error;
mod marketplace;
mod payment;
mod server;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use marketplace::MarketplaceConfig;
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Bind address, environment, log filter, timeouts, CORS
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL connection
    pub database: DatabaseConfig,

    /// Firebase ID token validation
    pub auth: AuthConfig,

    /// Stripe API and webhook secrets
    pub payment: PaymentConfig,

    /// Listing defaults
    #[serde(default)]
    pub marketplace: MarketplaceConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is read first when present.
    ///
    /// - `PORTAIL_HABITAT__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PORTAIL_HABITAT__DATABASE__URL=...` -> `database.url = ...`
    /// - `PORTAIL_HABITAT__PAYMENT__STRIPE_WEBHOOK_SECRET=whsec_...`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PORTAIL_HABITAT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic validation of every section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.payment.validate()?;
        self.marketplace.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
