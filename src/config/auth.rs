//! Authentication configuration (Firebase ID tokens)

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Firebase project id. Tokens must carry it as `aud` and in `iss`.
    pub firebase_project_id: String,

    /// Overrides Google's securetoken JWKS endpoint (emulators, tests).
    pub jwks_url: Option<String>,

    /// Fallback JWKS cache TTL when Google sends no `max-age`.
    #[serde(default = "default_jwks_cache_ttl")]
    pub jwks_cache_ttl_secs: u64,
}

impl AuthConfig {
    pub fn jwks_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.jwks_cache_ttl_secs)
    }

    /// An overridden JWKS URL must be HTTPS in production.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.firebase_project_id.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__FIREBASE_PROJECT_ID"));
        }
        let valid_chars = self
            .firebase_project_id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid_chars {
            return Err(ValidationError::InvalidFirebaseProject);
        }

        if let Some(url) = &self.jwks_url {
            if *environment == Environment::Production && !url.starts_with("https://") {
                return Err(ValidationError::JwksUrlMustBeHttps);
            }
        }

        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            firebase_project_id: String::new(),
            jwks_url: None,
            jwks_cache_ttl_secs: default_jwks_cache_ttl(),
        }
    }
}

fn default_jwks_cache_ttl() -> u64 {
    3600
}
