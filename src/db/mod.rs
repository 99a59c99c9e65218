use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::{ReferralStatus, UserRole};
use crate::models::referral::ReferralRequest;
use crate::models::user::User;

pub mod migrator;
pub mod repositories;

pub use repositories::referral::{NewReferral, ReferralInsert};
pub use repositories::user::{NewUser, ProfileChanges, UserInsert};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn referral_repo(&self) -> repositories::referral::ReferralRepository {
        repositories::referral::ReferralRepository::new(self.conn.clone())
    }

    // Users

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_subject(&self, subject_id: &str) -> Result<Option<User>> {
        self.user_repo().get_by_subject(subject_id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn list_users_by_role(&self, role: UserRole) -> Result<Vec<User>> {
        self.user_repo().list_by_role(role).await
    }

    pub async fn user_exists_by_email(&self, email: &str) -> Result<bool> {
        self.user_repo().exists_by_email(email).await
    }

    pub async fn user_exists_by_subject(&self, subject_id: &str) -> Result<bool> {
        self.user_repo().exists_by_subject(subject_id).await
    }

    pub async fn insert_user(&self, user: &NewUser) -> Result<UserInsert> {
        self.user_repo().insert(user).await
    }

    pub async fn mark_email_verified(&self, id: i32) -> Result<bool> {
        self.user_repo().mark_email_verified(id).await
    }

    pub async fn update_user_profile(
        &self,
        id: i32,
        changes: &ProfileChanges,
    ) -> Result<Option<User>> {
        self.user_repo().update_profile(id, changes).await
    }

    pub async fn set_user_role(&self, id: i32, role: UserRole) -> Result<Option<User>> {
        self.user_repo().set_role(id, role).await
    }

    pub async fn delete_user_by_subject(&self, subject_id: &str) -> Result<bool> {
        self.user_repo().delete_by_subject(subject_id).await
    }

    // Referral requests

    pub async fn insert_pending_referral(&self, referral: &NewReferral) -> Result<ReferralInsert> {
        self.referral_repo().insert_pending(referral).await
    }

    pub async fn get_referral(&self, id: i32) -> Result<Option<ReferralRequest>> {
        self.referral_repo().get(id).await
    }

    pub async fn list_referrals_by_job_seeker(&self, user_id: i32) -> Result<Vec<ReferralRequest>> {
        self.referral_repo().list_by_job_seeker(user_id).await
    }

    pub async fn list_referrals_by_employee(&self, user_id: i32) -> Result<Vec<ReferralRequest>> {
        self.referral_repo().list_by_employee(user_id).await
    }

    pub async fn list_referrals_by_status(
        &self,
        status: ReferralStatus,
    ) -> Result<Vec<ReferralRequest>> {
        self.referral_repo().list_by_status(status).await
    }

    pub async fn list_referrals_by_company(&self, company: &str) -> Result<Vec<ReferralRequest>> {
        self.referral_repo().list_by_company(company).await
    }

    pub async fn list_unclaimed_pending_referrals(
        &self,
        company: &str,
    ) -> Result<Vec<ReferralRequest>> {
        self.referral_repo().list_unclaimed_pending(company).await
    }

    pub async fn claim_referral(
        &self,
        id: i32,
        employee_id: i32,
        employee_company: &str,
    ) -> Result<bool> {
        self.referral_repo()
            .claim(id, employee_id, employee_company)
            .await
    }

    pub async fn transition_referral(
        &self,
        id: i32,
        target: ReferralStatus,
        actor_id: i32,
        actor_company: Option<&str>,
    ) -> Result<bool> {
        self.referral_repo()
            .transition(id, target, actor_id, actor_company)
            .await
    }

    pub async fn rate_referral(&self, id: i32, rating: i32) -> Result<bool> {
        self.referral_repo().set_rating_if_hired(id, rating).await
    }
}
