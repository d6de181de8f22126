//! Authentication adapters.
//!
//! Implementations of the `SessionValidator` port:
//!
//! - `firebase` - Firebase ID tokens checked against Google's JWKS
//! - `mock` - Fixed tokens for tests

mod firebase;
mod mock;

pub use firebase::{FirebaseConfig, FirebaseSessionValidator};
pub use mock::MockSessionValidator;
