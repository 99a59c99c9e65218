//! Domain service for the user directory.
//!
//! Provisions local accounts from verified identities, serves profile reads
//! and whitelisted profile edits, and removes accounts on request.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{UserId, UserRole};
use crate::models::user::User;
use crate::services::identity_service::VerifiedIdentity;

/// Errors specific to user directory operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Profile edit as submitted by a client.
///
/// `role`, `external_subject_id` and `auth_provider` are accepted only so they
/// can be rejected explicitly instead of being silently dropped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub company_name: Option<String>,
    pub profile_picture_url: Option<String>,
    #[serde(alias = "githubLink")]
    pub source_code_link: Option<String>,
    #[serde(alias = "linkedinLink")]
    pub professional_network_link: Option<String>,
    pub resume_link: Option<String>,

    pub role: Option<serde_json::Value>,
    #[serde(alias = "firebaseUid")]
    pub external_subject_id: Option<serde_json::Value>,
    pub auth_provider: Option<serde_json::Value>,
}

/// Outcome of a best-effort account removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    /// The identity provider confirmed removal
    pub identity_deleted: bool,
    /// A local row was removed by this call
    pub local_deleted: bool,
    /// No local row remains
    pub local_absent: bool,
}

impl DeletionReport {
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.local_absent
    }
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Returns the account for a verified identity, creating it on first sight.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::Conflict`] if the email belongs to another subject.
    async fn resolve_or_provision(&self, identity: &VerifiedIdentity) -> Result<User, UserError>;

    async fn get_by_id(&self, id: UserId) -> Result<User, UserError>;

    async fn get_by_subject_id(&self, subject_id: &str) -> Result<User, UserError>;

    async fn get_by_email(&self, email: &str) -> Result<User, UserError>;

    /// Applies the whitelisted profile fields. Blank strings clear a field.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::Validation`] on attempts to change protected fields.
    async fn update_profile(&self, id: UserId, update: ProfileUpdate) -> Result<User, UserError>;

    async fn list_by_role(&self, role: UserRole) -> Result<Vec<User>, UserError>;

    /// REGULAR accounts that have a company set.
    async fn list_employees(&self) -> Result<Vec<User>, UserError>;

    /// Administrative role change. Not reachable through profile updates.
    async fn set_role(&self, id: UserId, role: UserRole) -> Result<User, UserError>;

    /// Removes the account both upstream and locally. Each half is attempted
    /// regardless of the other.
    async fn delete_by_subject_id(&self, subject_id: &str) -> Result<DeletionReport, UserError>;
}
