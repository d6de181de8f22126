//! In-memory repositories for tests and database-less local runs.

mod artisan_repository;
mod lead_repository;
mod subscription_mirror;

pub use artisan_repository::InMemoryArtisanRepository;
pub use lead_repository::InMemoryLeadRepository;
pub use subscription_mirror::InMemorySubscriptionMirror;
