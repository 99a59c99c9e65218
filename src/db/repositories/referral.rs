use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, sea_query::Expr,
};

use crate::domain::ReferralStatus;
use crate::entities::referral_requests;
use crate::models::referral::{ReferralRequest, company_key};

#[derive(Debug, Clone)]
pub struct NewReferral {
    pub job_seeker_id: i32,
    pub job_title: String,
    pub job_id: Option<String>,
    pub job_link: Option<String>,
    pub company_name: String,
    pub source_code_link: Option<String>,
    pub professional_network_link: Option<String>,
    pub resume_link: Option<String>,
}

#[derive(Debug)]
pub enum ReferralInsert {
    Created(ReferralRequest),
    /// The job seeker already has a pending request for this company
    DuplicatePending,
}

pub struct ReferralRepository {
    conn: DatabaseConnection,
}

impl ReferralRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Check-and-insert in one statement: the partial unique index on
    /// `(job_seeker_id, company_key)` for pending rows rejects duplicates.
    pub async fn insert_pending(&self, new: &NewReferral) -> Result<ReferralInsert> {
        let active = referral_requests::ActiveModel {
            job_seeker_id: Set(new.job_seeker_id),
            employee_id: Set(None),
            job_title: Set(new.job_title.clone()),
            job_id: Set(new.job_id.clone()),
            job_link: Set(new.job_link.clone()),
            company_name: Set(new.company_name.clone()),
            company_key: Set(company_key(&new.company_name)),
            source_code_link: Set(new.source_code_link.clone()),
            professional_network_link: Set(new.professional_network_link.clone()),
            resume_link: Set(new.resume_link.clone()),
            status: Set(ReferralStatus::Pending),
            rating: Set(None),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            updated_at: Set(None),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(ReferralInsert::Created(ReferralRequest::from(model))),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(ReferralInsert::DuplicatePending)
            }
            Err(e) => Err(e).context("Failed to insert referral request"),
        }
    }

    pub async fn get(&self, id: i32) -> Result<Option<ReferralRequest>> {
        let row = referral_requests::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query referral request")?;

        Ok(row.map(ReferralRequest::from))
    }

    pub async fn list_by_job_seeker(&self, job_seeker_id: i32) -> Result<Vec<ReferralRequest>> {
        self.list(referral_requests::Column::JobSeekerId.eq(job_seeker_id))
            .await
            .context("Failed to list referrals by job seeker")
    }

    pub async fn list_by_employee(&self, employee_id: i32) -> Result<Vec<ReferralRequest>> {
        self.list(referral_requests::Column::EmployeeId.eq(employee_id))
            .await
            .context("Failed to list referrals by employee")
    }

    pub async fn list_by_status(&self, status: ReferralStatus) -> Result<Vec<ReferralRequest>> {
        self.list(referral_requests::Column::Status.eq(status))
            .await
            .context("Failed to list referrals by status")
    }

    pub async fn list_by_company(&self, company: &str) -> Result<Vec<ReferralRequest>> {
        self.list(referral_requests::Column::CompanyKey.eq(company_key(company)))
            .await
            .context("Failed to list referrals by company")
    }

    pub async fn list_unclaimed_pending(&self, company: &str) -> Result<Vec<ReferralRequest>> {
        let rows = referral_requests::Entity::find()
            .filter(referral_requests::Column::CompanyKey.eq(company_key(company)))
            .filter(referral_requests::Column::Status.eq(ReferralStatus::Pending))
            .filter(referral_requests::Column::EmployeeId.is_null())
            .order_by_asc(referral_requests::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list unclaimed referrals")?;

        Ok(rows.into_iter().map(ReferralRequest::from).collect())
    }

    async fn list(
        &self,
        condition: sea_orm::sea_query::SimpleExpr,
    ) -> Result<Vec<ReferralRequest>, sea_orm::DbErr> {
        let rows = referral_requests::Entity::find()
            .filter(condition)
            .order_by_asc(referral_requests::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(ReferralRequest::from).collect())
    }

    /// Compare-and-swap claim. Succeeds only if, at write time, the request
    /// is still pending, unclaimed, targets the employee's company and was
    /// not opened by the employee.
    pub async fn claim(&self, id: i32, employee_id: i32, employee_company: &str) -> Result<bool> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = referral_requests::Entity::update_many()
            .col_expr(referral_requests::Column::EmployeeId, Expr::value(employee_id))
            .col_expr(
                referral_requests::Column::Status,
                Expr::value(ReferralStatus::Accepted),
            )
            .col_expr(referral_requests::Column::UpdatedAt, Expr::value(now))
            .filter(referral_requests::Column::Id.eq(id))
            .filter(referral_requests::Column::Status.eq(ReferralStatus::Pending))
            .filter(referral_requests::Column::EmployeeId.is_null())
            .filter(referral_requests::Column::CompanyKey.eq(company_key(employee_company)))
            .filter(referral_requests::Column::JobSeekerId.ne(employee_id))
            .exec(&self.conn)
            .await
            .context("Failed to claim referral request")?;

        Ok(result.rows_affected == 1)
    }

    /// Moves the request to `target` only from one of its allowed
    /// predecessors, and only on behalf of the employee handling it. While the
    /// request is unclaimed any employee of its company may act.
    pub async fn transition(
        &self,
        id: i32,
        target: ReferralStatus,
        actor_id: i32,
        actor_company: Option<&str>,
    ) -> Result<bool> {
        let from = ReferralStatus::predecessors(target);
        if from.is_empty() {
            return Ok(false);
        }

        let mut handled_by_actor =
            Condition::any().add(referral_requests::Column::EmployeeId.eq(actor_id));
        if let Some(company) = actor_company {
            handled_by_actor = handled_by_actor.add(
                Condition::all()
                    .add(referral_requests::Column::EmployeeId.is_null())
                    .add(referral_requests::Column::CompanyKey.eq(company_key(company))),
            );
        }

        let now = chrono::Utc::now().to_rfc3339();

        let result = referral_requests::Entity::update_many()
            .col_expr(referral_requests::Column::Status, Expr::value(target))
            .col_expr(referral_requests::Column::UpdatedAt, Expr::value(now))
            .filter(referral_requests::Column::Id.eq(id))
            .filter(referral_requests::Column::Status.is_in(from.iter().copied()))
            .filter(handled_by_actor)
            .exec(&self.conn)
            .await
            .context("Failed to update referral status")?;

        Ok(result.rows_affected == 1)
    }

    pub async fn set_rating_if_hired(&self, id: i32, rating: i32) -> Result<bool> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = referral_requests::Entity::update_many()
            .col_expr(referral_requests::Column::Rating, Expr::value(rating))
            .col_expr(referral_requests::Column::UpdatedAt, Expr::value(now))
            .filter(referral_requests::Column::Id.eq(id))
            .filter(referral_requests::Column::Status.eq(ReferralStatus::Hired))
            .exec(&self.conn)
            .await
            .context("Failed to rate referral request")?;

        Ok(result.rows_affected == 1)
    }
}
