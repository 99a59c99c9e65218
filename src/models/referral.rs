use serde::Serialize;

use crate::domain::{ReferralId, ReferralStatus, UserId};
use crate::entities::referral_requests;

/// Key used for every case-insensitive company comparison.
///
/// ```rust
/// use referral_platform::models::referral::company_key;
///
/// assert_eq!(company_key("  Acme Corp "), "acme corp");
/// ```
#[must_use]
pub fn company_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferralRequest {
    pub id: ReferralId,
    pub job_seeker_id: UserId,
    pub employee_id: Option<UserId>,
    pub job_title: String,
    pub job_id: Option<String>,
    pub job_link: Option<String>,
    pub company_name: String,
    pub source_code_link: Option<String>,
    pub professional_network_link: Option<String>,
    pub resume_link: Option<String>,
    pub status: ReferralStatus,
    pub rating: Option<i32>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl ReferralRequest {
    #[must_use]
    pub fn is_job_seeker(&self, user_id: UserId) -> bool {
        self.job_seeker_id == user_id
    }

    /// An unclaimed request has no employee to match.
    #[must_use]
    pub fn is_employee(&self, user_id: UserId) -> bool {
        self.employee_id == Some(user_id)
    }

    #[must_use]
    pub fn involves(&self, user_id: UserId) -> bool {
        self.is_job_seeker(user_id) || self.is_employee(user_id)
    }

    #[must_use]
    pub fn is_claimable(&self) -> bool {
        self.status == ReferralStatus::Pending && self.employee_id.is_none()
    }

    #[must_use]
    pub fn company_key(&self) -> String {
        company_key(&self.company_name)
    }
}

impl From<referral_requests::Model> for ReferralRequest {
    fn from(model: referral_requests::Model) -> Self {
        Self {
            id: ReferralId::new(model.id),
            job_seeker_id: UserId::new(model.job_seeker_id),
            employee_id: model.employee_id.map(UserId::new),
            job_title: model.job_title,
            job_id: model.job_id,
            job_link: model.job_link,
            company_name: model.company_name,
            source_code_link: model.source_code_link,
            professional_network_link: model.professional_network_link,
            resume_link: model.resume_link,
            status: model.status,
            rating: model.rating,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(employee: Option<i32>) -> ReferralRequest {
        ReferralRequest {
            id: ReferralId::new(1),
            job_seeker_id: UserId::new(10),
            employee_id: employee.map(UserId::new),
            job_title: "SWE".to_string(),
            job_id: None,
            job_link: None,
            company_name: "Acme".to_string(),
            source_code_link: None,
            professional_network_link: None,
            resume_link: None,
            status: ReferralStatus::Pending,
            rating: None,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
            updated_at: None,
        }
    }

    #[test]
    fn predicates_on_unclaimed_request() {
        let req = request(None);
        assert!(req.is_job_seeker(UserId::new(10)));
        assert!(!req.is_employee(UserId::new(10)));
        assert!(!req.is_employee(UserId::new(0)));
        assert!(req.involves(UserId::new(10)));
        assert!(!req.involves(UserId::new(20)));
        assert!(req.is_claimable());
    }

    #[test]
    fn predicates_on_claimed_request() {
        let req = request(Some(20));
        assert!(req.is_employee(UserId::new(20)));
        assert!(req.involves(UserId::new(20)));
        assert!(!req.is_claimable());
    }
}
