use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(ReferralRequests)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        let conn = manager.get_connection();

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_referral_requests_job_seeker ON referral_requests(job_seeker_id)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_referral_requests_employee ON referral_requests(employee_id)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_referral_requests_company_status ON referral_requests(company_key, status)",
        )
        .await?;

        // At most one open request per job seeker and company.
        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_referral_requests_one_pending \
             ON referral_requests(job_seeker_id, company_key) WHERE status = 'PENDING'",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReferralRequests).to_owned())
            .await?;

        Ok(())
    }
}
