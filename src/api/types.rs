use serde::{Deserialize, Serialize};

use crate::domain::{AuthProvider, ReferralId, ReferralStatus, UserId, UserRole};
use crate::models::referral::ReferralRequest;
use crate::models::user::User;

/// Uniform response envelope. `data` is always present, `null` on errors.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    pub fn error_with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: Some(data),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub email_verified: bool,
    pub auth_provider: AuthProvider,
    pub role: UserRole,
    pub company_name: Option<String>,
    pub is_employee: bool,
    pub profile_picture_url: Option<String>,
    pub source_code_link: Option<String>,
    pub professional_network_link: Option<String>,
    pub resume_link: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            is_employee: user.has_employee_access(),
            id: user.id,
            email: user.email,
            name: user.name,
            email_verified: user.email_verified,
            auth_provider: user.auth_provider,
            role: user.role,
            company_name: user.company_name,
            profile_picture_url: user.profile_picture_url,
            source_code_link: user.source_code_link,
            professional_network_link: user.professional_network_link,
            resume_link: user.resume_link,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralDto {
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

impl From<ReferralRequest> for ReferralDto {
    fn from(r: ReferralRequest) -> Self {
        Self {
            id: r.id,
            job_seeker_id: r.job_seeker_id,
            employee_id: r.employee_id,
            job_title: r.job_title,
            job_id: r.job_id,
            job_link: r.job_link,
            company_name: r.company_name,
            source_code_link: r.source_code_link,
            professional_network_link: r.professional_network_link,
            resume_link: r.resume_link,
            status: r.status,
            rating: r.rating,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

pub fn referral_dtos(requests: Vec<ReferralRequest>) -> Vec<ReferralDto> {
    requests.into_iter().map(ReferralDto::from).collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenExchangeRequest {
    #[serde(default)]
    pub id_token: String,
}

/// Accepts both `{"status": "HIRED"}` and a bare `"HIRED"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StatusUpdateRequest {
    Wrapped { status: String },
    Bare(String),
}

impl StatusUpdateRequest {
    #[must_use]
    pub fn status(&self) -> &str {
        match self {
            Self::Wrapped { status } | Self::Bare(status) => status,
        }
    }
}

/// Accepts both `{"rating": 5}` and a bare `5`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RatingRequest {
    Wrapped { rating: i32 },
    Bare(i32),
}

impl RatingRequest {
    #[must_use]
    pub const fn rating(&self) -> i32 {
        match self {
            Self::Wrapped { rating } | Self::Bare(rating) => *rating,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusFilterQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
}
