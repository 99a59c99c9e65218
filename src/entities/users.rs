use sea_orm::entity::prelude::*;

use crate::domain::{AuthProvider, UserRole};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Subject identifier issued by the identity provider
    #[sea_orm(unique)]
    pub external_subject_id: String,

    #[sea_orm(unique)]
    pub email: String,

    pub name: Option<String>,

    pub email_verified: bool,

    pub auth_provider: AuthProvider,

    pub role: UserRole,

    /// Present only for accounts that act as employees
    pub company_name: Option<String>,

    pub profile_picture_url: Option<String>,
    pub source_code_link: Option<String>,
    pub professional_network_link: Option<String>,
    pub resume_link: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
