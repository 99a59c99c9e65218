//! `SeaORM` implementation of the `UserService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::constants::limits::{MAX_LINK_LEN, MAX_TEXT_FIELD_LEN};
use crate::db::{NewUser, ProfileChanges, Store, UserInsert};
use crate::domain::{UserId, UserRole};
use crate::models::user::User;
use crate::services::identity_service::{IdentityProvider, VerifiedIdentity};
use crate::services::user_service::{DeletionReport, ProfileUpdate, UserError, UserService};

pub struct SeaOrmUserService {
    store: Store,
    identity: Arc<dyn IdentityProvider>,
}

impl SeaOrmUserService {
    #[must_use]
    pub fn new(store: Store, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    async fn refresh_verification(
        &self,
        user: User,
        identity: &VerifiedIdentity,
    ) -> Result<User, UserError> {
        if user.email_verified || !identity.is_verified() {
            return Ok(user);
        }

        if self.store.mark_email_verified(user.id.value()).await? {
            info!(user_id = %user.id, "Email verified");
        }

        self.get_by_id(user.id).await
    }
}

/// Maps a submitted value to a change: absent leaves the field, blank clears it.
fn field_change(
    field: &str,
    value: Option<String>,
    max_len: usize,
) -> Result<Option<Option<String>>, UserError> {
    let Some(value) = value else {
        return Ok(None);
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(Some(None));
    }

    if trimmed.len() > max_len {
        return Err(UserError::Validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }

    Ok(Some(Some(trimmed.to_string())))
}

fn resolve_changes(update: ProfileUpdate) -> Result<ProfileChanges, UserError> {
    let mut protected = Vec::new();
    if update.role.is_some() {
        protected.push("role");
    }
    if update.external_subject_id.is_some() {
        protected.push("external_subject_id");
    }
    if update.auth_provider.is_some() {
        protected.push("auth_provider");
    }
    if !protected.is_empty() {
        return Err(UserError::Validation(format!(
            "Cannot change protected fields: {}",
            protected.join(", ")
        )));
    }

    Ok(ProfileChanges {
        name: field_change("name", update.name, MAX_TEXT_FIELD_LEN)?,
        company_name: field_change("company_name", update.company_name, MAX_TEXT_FIELD_LEN)?,
        profile_picture_url: field_change(
            "profile_picture_url",
            update.profile_picture_url,
            MAX_LINK_LEN,
        )?,
        source_code_link: field_change("source_code_link", update.source_code_link, MAX_LINK_LEN)?,
        professional_network_link: field_change(
            "professional_network_link",
            update.professional_network_link,
            MAX_LINK_LEN,
        )?,
        resume_link: field_change("resume_link", update.resume_link, MAX_LINK_LEN)?,
    })
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn resolve_or_provision(&self, identity: &VerifiedIdentity) -> Result<User, UserError> {
        if let Some(user) = self.store.get_user_by_subject(&identity.subject_id).await? {
            return self.refresh_verification(user, identity).await;
        }

        if self.store.user_exists_by_email(&identity.email).await? {
            return Err(UserError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let new_user = NewUser {
            external_subject_id: identity.subject_id.clone(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            email_verified: identity.is_verified(),
            auth_provider: identity.provider,
            profile_picture_url: identity.picture.clone(),
        };

        match self.store.insert_user(&new_user).await? {
            UserInsert::Created(user) => {
                info!(
                    user_id = %user.id,
                    provider = %user.auth_provider,
                    "Provisioned new user"
                );
                metrics::counter!("users_provisioned_total").increment(1);
                Ok(user)
            }
            // Lost a race with a concurrent first login, or the email was taken meanwhile
            UserInsert::Duplicate => {
                match self.store.get_user_by_subject(&identity.subject_id).await? {
                    Some(user) => self.refresh_verification(user, identity).await,
                    None => Err(UserError::Conflict(
                        "An account with this email already exists".to_string(),
                    )),
                }
            }
        }
    }

    async fn get_by_id(&self, id: UserId) -> Result<User, UserError> {
        self.store
            .get_user(id.value())
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn get_by_subject_id(&self, subject_id: &str) -> Result<User, UserError> {
        self.store
            .get_user_by_subject(subject_id)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn get_by_email(&self, email: &str) -> Result<User, UserError> {
        self.store
            .get_user_by_email(email)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn update_profile(&self, id: UserId, update: ProfileUpdate) -> Result<User, UserError> {
        let changes = resolve_changes(update)?;

        let user = self
            .store
            .update_user_profile(id.value(), &changes)
            .await?
            .ok_or(UserError::NotFound)?;

        info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    async fn list_by_role(&self, role: UserRole) -> Result<Vec<User>, UserError> {
        Ok(self.store.list_users_by_role(role).await?)
    }

    async fn list_employees(&self) -> Result<Vec<User>, UserError> {
        let users = self.store.list_users_by_role(UserRole::Regular).await?;
        Ok(users.into_iter().filter(User::has_employee_access).collect())
    }

    async fn set_role(&self, id: UserId, role: UserRole) -> Result<User, UserError> {
        let user = self
            .store
            .set_user_role(id.value(), role)
            .await?
            .ok_or(UserError::NotFound)?;

        info!(user_id = %user.id, role = %role, "Role changed");
        Ok(user)
    }

    async fn delete_by_subject_id(&self, subject_id: &str) -> Result<DeletionReport, UserError> {
        let identity_deleted = match self.identity.delete_account(subject_id).await {
            Ok(()) => {
                info!(subject_id, "Deleted account at identity provider");
                true
            }
            Err(e) => {
                warn!(subject_id, error = %e, "Failed to delete account at identity provider");
                false
            }
        };

        let local_deleted = match self.store.delete_user_by_subject(subject_id).await {
            Ok(deleted) => deleted,
            Err(e) => {
                warn!(subject_id, error = %e, "Failed to delete local account");
                false
            }
        };

        let local_absent = local_deleted || !self.store.user_exists_by_subject(subject_id).await?;

        let report = DeletionReport {
            identity_deleted,
            local_deleted,
            local_absent,
        };
        info!(subject_id, ?report, "Account deletion finished");

        Ok(report)
    }
}
