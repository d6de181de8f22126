//! Firebase ID token adapter.
//!
//! Implements the `SessionValidator` port for Firebase Authentication. A token
//! is accepted when:
//!
//! 1. Its `kid` names a key in Google's published JWKS for `securetoken`
//! 2. The RS256 signature verifies against that key
//! 3. `iss` is `https://securetoken.google.com/<project-id>`
//! 4. `aud` is the project id
//! 5. `exp` is in the future and `sub` is non-empty
//!
//! Keys are cached for as long as Google's `Cache-Control: max-age` allows,
//! falling back to the configured duration.
//!
//! # Example
//!
//! ```ignore
//! let config = FirebaseConfig::new("portail-habitat-prod");
//! let validator = FirebaseSessionValidator::new(config)?;
//! let user = validator.validate("eyJ...").await?;
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

const GOOGLE_SECURETOKEN_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

const DEFAULT_JWKS_CACHE: Duration = Duration::from_secs(3600);

/// Configuration for the Firebase adapter.
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Firebase project id; both the audience and the issuer suffix.
    pub project_id: String,

    /// Where to fetch signing keys. Overridable for tests.
    pub jwks_url: String,

    /// Used when Google's response carries no `max-age`.
    pub jwks_cache_duration: Duration,
}

impl FirebaseConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            jwks_url: GOOGLE_SECURETOKEN_JWKS_URL.to_string(),
            jwks_cache_duration: DEFAULT_JWKS_CACHE,
        }
    }

    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = url.into();
        self
    }

    pub fn with_cache_duration(mut self, duration: Duration) -> Self {
        self.jwks_cache_duration = duration;
        self
    }

    fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }
}

/// Claims read from a Firebase ID token.
#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    /// Firebase uid.
    sub: String,

    #[serde(default)]
    email: Option<String>,

    #[serde(default)]
    email_verified: Option<bool>,
}

struct JwksCache {
    jwks: JwkSet,
    fetched_at: Instant,
    ttl: Duration,
}

impl JwksCache {
    fn is_expired(&self) -> bool {
        self.fetched_at.elapsed() > self.ttl
    }
}

/// Firebase ID token validator.
pub struct FirebaseSessionValidator {
    config: FirebaseConfig,
    http_client: reqwest::Client,
    jwks_cache: Arc<RwLock<Option<JwksCache>>>,
}

impl FirebaseSessionValidator {
    /// Keys are fetched lazily on first validation, not here.
    pub fn new(config: FirebaseConfig) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AuthError::service_unavailable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            jwks_cache: Arc::new(RwLock::new(None)),
        })
    }

    async fn fetch_jwks(&self) -> Result<(JwkSet, Option<Duration>), AuthError> {
        let url = &self.config.jwks_url;
        tracing::debug!(url = %url, "Fetching Firebase signing keys");

        let response = self.http_client.get(url).send().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch JWKS");
            AuthError::service_unavailable(format!("Failed to fetch JWKS: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(%status, "JWKS endpoint returned an error");
            return Err(AuthError::service_unavailable(format!(
                "JWKS endpoint returned {}",
                status
            )));
        }

        let max_age = response
            .headers()
            .get(reqwest::header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_max_age);

        let jwks: JwkSet = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse JWKS");
            AuthError::service_unavailable(format!("Failed to parse JWKS: {}", e))
        })?;

        tracing::debug!(keys = jwks.keys.len(), ?max_age, "Fetched JWKS");
        Ok((jwks, max_age))
    }

    async fn get_jwks(&self) -> Result<JwkSet, AuthError> {
        {
            let cache = self.jwks_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if !cached.is_expired() {
                    return Ok(cached.jwks.clone());
                }
            }
        }

        let (jwks, max_age) = self.fetch_jwks().await?;

        let mut cache = self.jwks_cache.write().await;
        *cache = Some(JwksCache {
            jwks: jwks.clone(),
            fetched_at: Instant::now(),
            ttl: max_age.unwrap_or(self.config.jwks_cache_duration),
        });

        Ok(jwks)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.config.issuer()]);
        validation.set_audience(&[&self.config.project_id]);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation
    }
}

/// Reads `max-age=N` out of a `Cache-Control` header value.
fn parse_max_age(header: &str) -> Option<Duration> {
    header
        .split(',')
        .map(str::trim)
        .find_map(|directive| directive.strip_prefix("max-age="))
        .and_then(|secs| secs.parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[async_trait]
impl SessionValidator for FirebaseSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let header = decode_header(token).map_err(|e| {
            tracing::debug!(error = %e, "Failed to decode JWT header");
            AuthError::InvalidToken
        })?;

        if header.alg != Algorithm::RS256 {
            tracing::warn!(alg = ?header.alg, "Rejected token with unexpected algorithm");
            return Err(AuthError::InvalidToken);
        }

        let kid = header.kid.ok_or_else(|| {
            tracing::warn!("JWT missing 'kid' header");
            AuthError::InvalidToken
        })?;

        let jwks = self.get_jwks().await?;
        let jwk = jwks.find(&kid).ok_or_else(|| {
            tracing::warn!(kid = %kid, "No matching signing key");
            AuthError::InvalidToken
        })?;

        let decoding_key = DecodingKey::from_jwk(jwk).map_err(|e| {
            tracing::warn!(error = %e, "Failed to build decoding key");
            AuthError::InvalidToken
        })?;

        let claims = decode::<FirebaseClaims>(token, &decoding_key, &self.validation())
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => {
                        tracing::warn!(error = %e, "Token validation failed");
                        AuthError::InvalidToken
                    }
                }
            })?
            .claims;

        let user_id = UserId::new(claims.sub).map_err(|_| {
            tracing::warn!("Token has an empty subject");
            AuthError::InvalidToken
        })?;

        Ok(AuthenticatedUser::new(
            user_id,
            claims.email,
            claims.email_verified.unwrap_or(false),
        ))
    }
}

impl std::fmt::Debug for FirebaseSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseSessionValidator")
            .field("project_id", &self.config.project_id)
            .finish_non_exhaustive()
    }
}
