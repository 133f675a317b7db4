use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::RepositoryError;
use crate::models::Report;
use crate::repositories::traits::ReportStore;

/// Append-only log of abuse reports
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Reports filed against a user, newest first
    pub async fn find_by_subject(&self, subject_id: i64) -> Result<Vec<Report>, RepositoryError> {
        let reports = sqlx::query_as::<_, Report>(
            r#"
            SELECT id, user_id, reporter_id, report, created_at
            FROM reports
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reports)
    }
}

#[async_trait]
impl ReportStore for ReportRepository {
    async fn create_report(
        &self,
        subject_id: i64,
        reporter_id: i64,
        reason: &str,
    ) -> Result<Report, RepositoryError> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO reports (user_id, reporter_id, report)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, reporter_id, report, created_at
            "#,
        )
        .bind(subject_id)
        .bind(reporter_id)
        .bind(reason)
        .fetch_one(&self.pool)
        .await?;

        Ok(report)
    }
}
