//! Ports: the traits the application layer depends on.
//!
//! Adapters under `crate::adapters` implement them for PostgreSQL, Stripe,
//! Firebase and in-memory test doubles.

mod artisan_repository;
mod lead_repository;
mod payment_provider;
mod session_validator;
mod subscription_mirror;

pub use artisan_repository::ArtisanRepository;
pub use lead_repository::{LeadRepository, ListingStrategy};
pub use payment_provider::{PaymentError, PaymentErrorCode, PaymentProvider, ProviderSubscription};
pub use session_validator::SessionValidator;
pub use subscription_mirror::SubscriptionMirrorRepository;
