use serde::Serialize;

use crate::domain::{AuthProvider, UserId, UserRole};
use crate::entities::users;

/// A local account, provisioned from an external identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub external_subject_id: String,
    pub email: String,
    pub name: Option<String>,
    pub email_verified: bool,
    pub auth_provider: AuthProvider,
    pub role: UserRole,
    pub company_name: Option<String>,
    pub profile_picture_url: Option<String>,
    pub source_code_link: Option<String>,
    pub professional_network_link: Option<String>,
    pub resume_link: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Employee capability comes from having a company, not from the role.
    #[must_use]
    pub fn has_employee_access(&self) -> bool {
        self.company_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty())
    }

    /// Normalized company used to match referral requests.
    #[must_use]
    pub fn company_key(&self) -> Option<String> {
        self.company_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .map(crate::models::referral::company_key)
    }

    /// Password accounts must confirm their email before doing anything.
    #[must_use]
    pub fn requires_verification(&self) -> bool {
        self.auth_provider == AuthProvider::EmailPassword && !self.email_verified
    }
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: UserId::new(model.id),
            external_subject_id: model.external_subject_id,
            email: model.email,
            name: model.name,
            email_verified: model.email_verified,
            auth_provider: model.auth_provider,
            role: model.role,
            company_name: model.company_name,
            profile_picture_url: model.profile_picture_url,
            source_code_link: model.source_code_link,
            professional_network_link: model.professional_network_link,
            resume_link: model.resume_link,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(company: Option<&str>) -> User {
        User {
            id: UserId::new(1),
            external_subject_id: "sub-1".to_string(),
            email: "a@example.com".to_string(),
            name: None,
            email_verified: false,
            auth_provider: AuthProvider::EmailPassword,
            role: UserRole::Regular,
            company_name: company.map(str::to_string),
            profile_picture_url: None,
            source_code_link: None,
            professional_network_link: None,
            resume_link: None,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
            updated_at: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn employee_access_needs_a_company() {
        assert!(!user(None).has_employee_access());
        assert!(!user(Some("   ")).has_employee_access());
        assert!(user(Some("Acme")).has_employee_access());
        assert_eq!(user(Some(" Acme ")).company_key().as_deref(), Some("acme"));
    }

    #[test]
    fn only_unverified_password_accounts_require_verification() {
        let mut u = user(None);
        assert!(u.requires_verification());

        u.email_verified = true;
        assert!(!u.requires_verification());

        u.email_verified = false;
        u.auth_provider = AuthProvider::ExternalOauth;
        assert!(!u.requires_verification());
    }
}
