//! Domain service for the referral request lifecycle.
//!
//! Owns state transitions and the read-only ownership predicates the API
//! layer checks before delegating here.

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{ReferralId, ReferralStatus, UserId};
use crate::models::referral::ReferralRequest;
use crate::models::user::User;

/// Errors specific to referral operations.
#[derive(Debug, Error)]
pub enum ReferralError {
    #[error("Referral request not found")]
    NotFound,

    /// Business rule violation: duplicate pending request, lost claim,
    /// illegal status change, or rating before hire.
    #[error("{0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The caller may not act on this request.
    #[error("{0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ReferralError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ReferralError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Submitted fields for a new referral request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReferral {
    #[serde(default)]
    pub job_title: String,
    pub job_id: Option<String>,
    pub job_link: Option<String>,
    #[serde(default)]
    pub company_name: String,
    #[serde(alias = "githubLink")]
    pub source_code_link: Option<String>,
    #[serde(alias = "linkedinLink")]
    pub professional_network_link: Option<String>,
    pub resume_link: Option<String>,
}

#[async_trait::async_trait]
pub trait ReferralService: Send + Sync {
    /// Opens a new PENDING request for `job_seeker`.
    ///
    /// # Errors
    ///
    /// - [`ReferralError::Validation`] if the job title or company is blank.
    /// - [`ReferralError::Conflict`] if a pending request for the same company
    ///   already exists for this job seeker.
    async fn create(
        &self,
        job_seeker: UserId,
        input: CreateReferral,
    ) -> Result<ReferralRequest, ReferralError>;

    async fn get(&self, id: ReferralId) -> Result<ReferralRequest, ReferralError>;

    /// Attaches `employee` to an unclaimed pending request of their company
    /// and moves it to ACCEPTED. At most one claim can ever succeed.
    ///
    /// # Errors
    ///
    /// Returns [`ReferralError::Conflict`] if the request is already claimed,
    /// no longer pending, targets another company, or was opened by `employee`.
    async fn claim(&self, id: ReferralId, employee: &User)
    -> Result<ReferralRequest, ReferralError>;

    /// Moves a request along an allowed edge: PENDING→REJECTED,
    /// ACCEPTED→HIRED or ACCEPTED→REJECTED.
    ///
    /// `actor` must be the claiming employee, or an employee of the request's
    /// company while it is unclaimed. Both checks happen in the same write.
    ///
    /// # Errors
    ///
    /// - [`ReferralError::Conflict`] for an edge the state machine forbids.
    /// - [`ReferralError::Forbidden`] if `actor` is not handling the request.
    async fn set_status(
        &self,
        id: ReferralId,
        status: ReferralStatus,
        actor: &User,
    ) -> Result<ReferralRequest, ReferralError>;

    /// Rates a hired request. Re-rating overwrites.
    async fn rate(&self, id: ReferralId, rating: i32) -> Result<ReferralRequest, ReferralError>;

    async fn list_by_job_seeker(&self, user: UserId) -> Result<Vec<ReferralRequest>, ReferralError>;

    async fn list_by_employee(&self, user: UserId) -> Result<Vec<ReferralRequest>, ReferralError>;

    async fn list_by_status(
        &self,
        status: ReferralStatus,
    ) -> Result<Vec<ReferralRequest>, ReferralError>;

    /// Unclaimed PENDING requests for the employee's company. Empty for
    /// accounts without a company.
    async fn list_unclaimed_for_employee(
        &self,
        employee: &User,
    ) -> Result<Vec<ReferralRequest>, ReferralError>;

    async fn list_by_company(&self, company: &str) -> Result<Vec<ReferralRequest>, ReferralError>;

    /// Employee-side matches followed by job-seeker-side matches.
    async fn filter_by_status_for_user(
        &self,
        user: UserId,
        status: ReferralStatus,
    ) -> Result<Vec<ReferralRequest>, ReferralError>;

    /// False for an absent request.
    async fn is_user_involved(&self, id: ReferralId, user: UserId) -> Result<bool, ReferralError>;

    async fn is_employee_on_request(
        &self,
        id: ReferralId,
        user: UserId,
    ) -> Result<bool, ReferralError>;

    async fn is_job_seeker_on_request(
        &self,
        id: ReferralId,
        user: UserId,
    ) -> Result<bool, ReferralError>;
}
