//! Mock session validator for tests.
//!
//! Maps fixed token strings to users so HTTP tests can authenticate without a
//! Firebase project.
//!
//! ```ignore
//! let validator = MockSessionValidator::new().with_test_user("token-1", "firebase-uid-1");
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Tokens not in the map return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, AuthenticatedUser>>,
    force_error: RwLock<Option<AuthError>>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.tokens
            .write()
            .expect("mock lock poisoned")
            .insert(token.into(), user);
        self
    }

    /// Adds a token for a verified user with a generated email.
    pub fn with_test_user(self, token: impl Into<String>, uid: impl Into<String>) -> Self {
        let uid = uid.into();
        let user = AuthenticatedUser::new(
            UserId::new(uid.clone()).expect("test uid must not be blank"),
            Some(format!("{}@test.portail-habitat.fr", uid)),
            true,
        );
        self.with_user(token, user)
    }

    /// Every validation returns `error`.
    pub fn with_error(self, error: AuthError) -> Self {
        *self.force_error.write().expect("mock lock poisoned") = Some(error);
        self
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if let Some(error) = self.force_error.read().expect("mock lock poisoned").clone() {
            return Err(error);
        }

        self.tokens
            .read()
            .expect("mock lock poisoned")
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
