//! External identity provider boundary.
//!
//! The service never sees credentials. It receives an opaque ID token, asks
//! the provider who it belongs to, and provisions a local account from the
//! answer.

use thiserror::Error;

use crate::domain::AuthProvider;

#[derive(Debug, Error)]
pub enum IdentityError {
    /// Bad signature, wrong audience, expired, or malformed token.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),

    #[error("Identity provider error: {0}")]
    Provider(String),
}

impl From<reqwest::Error> for IdentityError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Claims extracted from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub subject_id: String,
    pub email: String,
    pub email_verified: bool,
    pub provider: AuthProvider,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl VerifiedIdentity {
    /// OAuth sign-ins are verified by the upstream provider.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.email_verified || self.provider == AuthProvider::ExternalOauth
    }
}

#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verifies an opaque token and returns the identity it was issued for.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidToken`] if the token cannot be trusted.
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError>;

    /// Removes the account on the provider side.
    async fn delete_account(&self, subject_id: &str) -> Result<(), IdentityError>;
}
