//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresArtisanRepository` - Artisan records with optimistic versioning
//! - `PostgresSubscriptionMirror` - Best-effort mirrored subscription rows
//! - `PostgresLeadRepository` - Marketplace leads and transactional purchases
//!
//! Schema lives in `migrations/`, embedded with `sqlx::migrate!`.

mod artisan_repository;
mod lead_repository;
mod subscription_mirror;

pub use artisan_repository::PostgresArtisanRepository;
pub use lead_repository::PostgresLeadRepository;
pub use subscription_mirror::PostgresSubscriptionMirror;
