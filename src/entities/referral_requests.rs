use sea_orm::entity::prelude::*;

use crate::domain::ReferralStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "referral_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub job_seeker_id: i32,

    /// Set once, by the employee who claims the request
    pub employee_id: Option<i32>,

    pub job_title: String,
    pub job_id: Option<String>,
    pub job_link: Option<String>,

    pub company_name: String,

    /// Trimmed, lower-cased `company_name` used for matching
    pub company_key: String,

    pub source_code_link: Option<String>,
    pub professional_network_link: Option<String>,
    pub resume_link: Option<String>,

    pub status: ReferralStatus,

    pub rating: Option<i32>,

    pub created_at: String,

    pub updated_at: Option<String>,
}

// No foreign keys: deleting an account leaves its referrals in place.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
