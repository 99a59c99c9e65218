use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr, sea_query::Expr,
};

use crate::domain::{AuthProvider, UserRole};
use crate::entities::users;
use crate::models::user::User;

/// Fields needed to provision an account on first sign-in.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub external_subject_id: String,
    pub email: String,
    pub name: Option<String>,
    pub email_verified: bool,
    pub auth_provider: AuthProvider,
    pub profile_picture_url: Option<String>,
}

#[derive(Debug)]
pub enum UserInsert {
    Created(User),
    /// Subject or email already taken
    Duplicate,
}

/// Resolved profile edit. `Some(None)` clears a field, `None` leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub name: Option<Option<String>>,
    pub company_name: Option<Option<String>>,
    pub profile_picture_url: Option<Option<String>>,
    pub source_code_link: Option<Option<String>>,
    pub professional_network_link: Option<Option<String>>,
    pub resume_link: Option<Option<String>>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_subject(&self, subject_id: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::ExternalSubjectId.eq(subject_id))
            .one(&self.conn)
            .await
            .context("Failed to query user by subject")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }

    pub async fn list_by_role(&self, role: UserRole) -> Result<Vec<User>> {
        let rows = users::Entity::find()
            .filter(users::Column::Role.eq(role))
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list users by role")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn exists_by_email(&self, email: &str) -> Result<bool> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("Failed to count users by email")?;

        Ok(count > 0)
    }

    pub async fn exists_by_subject(&self, subject_id: &str) -> Result<bool> {
        let count = users::Entity::find()
            .filter(users::Column::ExternalSubjectId.eq(subject_id))
            .count(&self.conn)
            .await
            .context("Failed to count users by subject")?;

        Ok(count > 0)
    }

    /// Inserts a new REGULAR account. Unique violations are reported as
    /// [`UserInsert::Duplicate`] instead of an error.
    pub async fn insert(&self, new_user: &NewUser) -> Result<UserInsert> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = users::ActiveModel {
            external_subject_id: Set(new_user.external_subject_id.clone()),
            email: Set(new_user.email.clone()),
            name: Set(new_user.name.clone()),
            email_verified: Set(new_user.email_verified),
            auth_provider: Set(new_user.auth_provider),
            role: Set(UserRole::Regular),
            company_name: Set(None),
            profile_picture_url: Set(new_user.profile_picture_url.clone()),
            source_code_link: Set(None),
            professional_network_link: Set(None),
            resume_link: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(UserInsert::Created(User::from(model))),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(UserInsert::Duplicate)
            }
            Err(e) => Err(e).context("Failed to insert user"),
        }
    }

    /// Flips `email_verified` to true. Never goes back to false.
    pub async fn mark_email_verified(&self, id: i32) -> Result<bool> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = users::Entity::update_many()
            .col_expr(users::Column::EmailVerified, Expr::value(true))
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::Id.eq(id))
            .filter(users::Column::EmailVerified.eq(false))
            .exec(&self.conn)
            .await
            .context("Failed to mark email verified")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn update_profile(&self, id: i32, changes: &ProfileChanges) -> Result<Option<User>> {
        let Some(user) = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for profile update")?
        else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        if let Some(name) = &changes.name {
            active.name = Set(name.clone());
        }
        if let Some(company) = &changes.company_name {
            active.company_name = Set(company.clone());
        }
        if let Some(picture) = &changes.profile_picture_url {
            active.profile_picture_url = Set(picture.clone());
        }
        if let Some(link) = &changes.source_code_link {
            active.source_code_link = Set(link.clone());
        }
        if let Some(link) = &changes.professional_network_link {
            active.professional_network_link = Set(link.clone());
        }
        if let Some(link) = &changes.resume_link {
            active.resume_link = Set(link.clone());
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update user profile")?;

        Ok(Some(User::from(model)))
    }

    pub async fn set_role(&self, id: i32, role: UserRole) -> Result<Option<User>> {
        let Some(user) = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for role change")?
        else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        active.role = Set(role);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update user role")?;

        Ok(Some(User::from(model)))
    }

    /// Returns true if a row was removed.
    pub async fn delete_by_subject(&self, subject_id: &str) -> Result<bool> {
        let result = users::Entity::delete_many()
            .filter(users::Column::ExternalSubjectId.eq(subject_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete user")?;

        Ok(result.rows_affected > 0)
    }
}
