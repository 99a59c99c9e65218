//! `SeaORM` implementation of the `ReferralService` trait.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::constants::limits::{MAX_LINK_LEN, MAX_TEXT_FIELD_LEN};
use crate::constants::referrals::{MAX_RATING, MIN_RATING};
use crate::db::{NewReferral, ReferralInsert, Store};
use crate::domain::{ReferralId, ReferralStatus, UserId};
use crate::models::referral::ReferralRequest;
use crate::models::user::User;
use crate::services::referral_service::{CreateReferral, ReferralError, ReferralService};

pub struct SeaOrmReferralService {
    store: Store,
}

impl SeaOrmReferralService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn find(&self, id: ReferralId) -> Result<Option<ReferralRequest>, ReferralError> {
        Ok(self.store.get_referral(id.value()).await?)
    }
}

fn required(field: &str, value: &str) -> Result<String, ReferralError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ReferralError::Validation(format!("{field} is required")));
    }
    if trimmed.len() > MAX_TEXT_FIELD_LEN {
        return Err(ReferralError::Validation(format!(
            "{field} must be at most {MAX_TEXT_FIELD_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn optional(field: &str, value: Option<String>) -> Result<Option<String>, ReferralError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.len() > MAX_LINK_LEN {
        return Err(ReferralError::Validation(format!(
            "{field} must be at most {MAX_LINK_LEN} characters"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

#[async_trait]
impl ReferralService for SeaOrmReferralService {
    async fn create(
        &self,
        job_seeker: UserId,
        input: CreateReferral,
    ) -> Result<ReferralRequest, ReferralError> {
        let new = NewReferral {
            job_seeker_id: job_seeker.value(),
            job_title: required("Job title", &input.job_title)?,
            job_id: optional("Job id", input.job_id)?,
            job_link: optional("Job link", input.job_link)?,
            company_name: required("Company name", &input.company_name)?,
            source_code_link: optional("Source code link", input.source_code_link)?,
            professional_network_link: optional(
                "Professional network link",
                input.professional_network_link,
            )?,
            resume_link: optional("Resume link", input.resume_link)?,
        };

        match self.store.insert_pending_referral(&new).await? {
            ReferralInsert::Created(request) => {
                info!(
                    referral_id = %request.id,
                    job_seeker_id = %job_seeker,
                    company = %request.company_name,
                    "Referral request created"
                );
                metrics::counter!("referrals_created_total").increment(1);
                Ok(request)
            }
            ReferralInsert::DuplicatePending => Err(ReferralError::Conflict(
                "A pending referral request for this company already exists".to_string(),
            )),
        }
    }

    async fn get(&self, id: ReferralId) -> Result<ReferralRequest, ReferralError> {
        self.find(id).await?.ok_or(ReferralError::NotFound)
    }

    async fn claim(
        &self,
        id: ReferralId,
        employee: &User,
    ) -> Result<ReferralRequest, ReferralError> {
        let Some(company) = employee
            .company_name
            .as_deref()
            .filter(|_| employee.has_employee_access())
        else {
            return Err(ReferralError::Conflict(
                "Only company employees can claim referral requests".to_string(),
            ));
        };

        if self
            .store
            .claim_referral(id.value(), employee.id.value(), company)
            .await?
        {
            info!(referral_id = %id, employee_id = %employee.id, "Referral request claimed");
            metrics::counter!("referral_claims_total", "outcome" => "won").increment(1);
            return self.get(id).await;
        }

        let current = self.find(id).await?.ok_or(ReferralError::NotFound)?;
        metrics::counter!("referral_claims_total", "outcome" => "lost").increment(1);
        debug!(referral_id = %id, status = %current.status, "Claim rejected");

        if current.is_job_seeker(employee.id) {
            return Err(ReferralError::Conflict(
                "Cannot claim your own referral request".to_string(),
            ));
        }

        if current.is_claimable() && employee.company_key() != Some(current.company_key()) {
            return Err(ReferralError::Conflict(
                "Referral request belongs to a different company".to_string(),
            ));
        }

        Err(ReferralError::Conflict(
            "Referral request already claimed or not pending".to_string(),
        ))
    }

    async fn set_status(
        &self,
        id: ReferralId,
        status: ReferralStatus,
        actor: &User,
    ) -> Result<ReferralRequest, ReferralError> {
        let actor_company = actor
            .company_name
            .as_deref()
            .filter(|_| actor.has_employee_access());

        if self
            .store
            .transition_referral(id.value(), status, actor.id.value(), actor_company)
            .await?
        {
            info!(referral_id = %id, status = %status, actor_id = %actor.id, "Referral status updated");
            metrics::counter!("referral_transitions_total", "to" => status.as_str()).increment(1);
            return self.get(id).await;
        }

        let current = self.find(id).await?.ok_or(ReferralError::NotFound)?;

        if status == ReferralStatus::Accepted {
            return Err(ReferralError::Conflict(
                "Referral requests are accepted by claiming them".to_string(),
            ));
        }

        if !current.status.can_transition_to(status) {
            return Err(ReferralError::Conflict(format!(
                "Cannot change status from {} to {}",
                current.status, status
            )));
        }

        debug!(referral_id = %id, actor_id = %actor.id, "Status change refused for non-handler");
        Err(ReferralError::Forbidden(
            "Only the employee handling this request can change its status".to_string(),
        ))
    }

    async fn rate(&self, id: ReferralId, rating: i32) -> Result<ReferralRequest, ReferralError> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(ReferralError::Validation(format!(
                "Rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }

        if self.store.rate_referral(id.value(), rating).await? {
            info!(referral_id = %id, rating, "Referral request rated");
            return self.get(id).await;
        }

        self.find(id).await?.ok_or(ReferralError::NotFound)?;

        Err(ReferralError::Conflict(
            "Can only rate hired referrals".to_string(),
        ))
    }

    async fn list_by_job_seeker(&self, user: UserId) -> Result<Vec<ReferralRequest>, ReferralError> {
        Ok(self.store.list_referrals_by_job_seeker(user.value()).await?)
    }

    async fn list_by_employee(&self, user: UserId) -> Result<Vec<ReferralRequest>, ReferralError> {
        Ok(self.store.list_referrals_by_employee(user.value()).await?)
    }

    async fn list_by_status(
        &self,
        status: ReferralStatus,
    ) -> Result<Vec<ReferralRequest>, ReferralError> {
        Ok(self.store.list_referrals_by_status(status).await?)
    }

    async fn list_unclaimed_for_employee(
        &self,
        employee: &User,
    ) -> Result<Vec<ReferralRequest>, ReferralError> {
        if !employee.has_employee_access() {
            return Ok(Vec::new());
        }

        let company = employee.company_name.as_deref().unwrap_or_default();
        Ok(self.store.list_unclaimed_pending_referrals(company).await?)
    }

    async fn list_by_company(&self, company: &str) -> Result<Vec<ReferralRequest>, ReferralError> {
        if company.trim().is_empty() {
            return Err(ReferralError::Validation(
                "Company name is required".to_string(),
            ));
        }

        Ok(self.store.list_referrals_by_company(company).await?)
    }

    async fn filter_by_status_for_user(
        &self,
        user: UserId,
        status: ReferralStatus,
    ) -> Result<Vec<ReferralRequest>, ReferralError> {
        let as_employee = self.store.list_referrals_by_employee(user.value()).await?;
        let as_job_seeker = self.store.list_referrals_by_job_seeker(user.value()).await?;

        Ok(as_employee
            .into_iter()
            .chain(as_job_seeker)
            .filter(|r| r.status == status)
            .collect())
    }

    async fn is_user_involved(&self, id: ReferralId, user: UserId) -> Result<bool, ReferralError> {
        Ok(self.find(id).await?.is_some_and(|r| r.involves(user)))
    }

    async fn is_employee_on_request(
        &self,
        id: ReferralId,
        user: UserId,
    ) -> Result<bool, ReferralError> {
        Ok(self.find(id).await?.is_some_and(|r| r.is_employee(user)))
    }

    async fn is_job_seeker_on_request(
        &self,
        id: ReferralId,
        user: UserId,
    ) -> Result<bool, ReferralError> {
        Ok(self.find(id).await?.is_some_and(|r| r.is_job_seeker(user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_fields_are_trimmed() {
        assert_eq!(required("Job title", "  SWE ").unwrap(), "SWE");
        assert!(matches!(
            required("Job title", "   "),
            Err(ReferralError::Validation(msg)) if msg == "Job title is required"
        ));
    }

    #[test]
    fn blank_optional_fields_become_none() {
        assert_eq!(optional("Job link", Some("  ".to_string())).unwrap(), None);
        assert_eq!(
            optional("Job link", Some("https://jobs.example.com/1".to_string())).unwrap(),
            Some("https://jobs.example.com/1".to_string())
        );
    }
}
