#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use referral_platform::config::Config;
use referral_platform::domain::AuthProvider;
use referral_platform::models::user::User;
use referral_platform::services::{
    IdentityError, IdentityProvider, ProfileUpdate, VerifiedIdentity,
};
use referral_platform::state::SharedState;

/// In-memory identity provider: tokens are registered up front.
#[derive(Default)]
pub struct FakeIdentity {
    tokens: Mutex<HashMap<String, VerifiedIdentity>>,
    deleted: Mutex<Vec<String>>,
    fail_deletes: AtomicBool,
}

impl FakeIdentity {
    pub fn register(&self, token: &str, identity: VerifiedIdentity) {
        self.tokens
            .lock()
            .unwrap()
            .insert(token.to_string(), identity);
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl IdentityProvider for FakeIdentity {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        self.tokens
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or_else(|| IdentityError::InvalidToken("unknown token".to_string()))
    }

    async fn delete_account(&self, subject_id: &str) -> Result<(), IdentityError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(IdentityError::Unavailable("provider down".to_string()));
        }
        self.deleted.lock().unwrap().push(subject_id.to_string());
        Ok(())
    }
}

pub fn identity(
    subject: &str,
    email: &str,
    email_verified: bool,
    provider: AuthProvider,
) -> VerifiedIdentity {
    VerifiedIdentity {
        subject_id: subject.to_string(),
        email: email.to_string(),
        email_verified,
        provider,
        name: None,
        picture: None,
    }
}

pub fn google(subject: &str, email: &str) -> VerifiedIdentity {
    identity(subject, email, true, AuthProvider::ExternalOauth)
}

pub async fn test_state(fake: Arc<FakeIdentity>) -> SharedState {
    let db_path =
        std::env::temp_dir().join(format!("referral-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());

    SharedState::with_identity(config, fake)
        .await
        .expect("Failed to create test state")
}

pub async fn spawn_app(fake: Arc<FakeIdentity>) -> (Router, Arc<SharedState>) {
    let shared = Arc::new(test_state(fake).await);
    let app_state = referral_platform::api::create_app_state(shared.clone(), None);
    (referral_platform::api::router(app_state), shared)
}

/// Provisions a verified account, optionally attached to a company.
pub async fn provision(
    state: &SharedState,
    subject: &str,
    email: &str,
    company: Option<&str>,
) -> User {
    let user = state
        .user_service
        .resolve_or_provision(&google(subject, email))
        .await
        .expect("provision");

    match company {
        Some(company) => state
            .user_service
            .update_profile(
                user.id,
                ProfileUpdate {
                    company_name: Some(company.to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .expect("set company"),
        None => user,
    }
}
