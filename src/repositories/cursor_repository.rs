use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::RepositoryError;
use crate::repositories::traits::CursorStore;

/// Keeps the getUpdates offset across restarts
pub struct CursorRepository {
    pool: PgPool,
}

impl CursorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CursorStore for CursorRepository {
    async fn load_offset(&self) -> Result<i64, RepositoryError> {
        let offset: Option<i64> =
            sqlx::query_scalar("SELECT next_offset FROM update_cursor WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(offset.unwrap_or(0))
    }

    async fn save_offset(&self, offset: i64) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO update_cursor (id, next_offset, updated_at)
            VALUES (1, $1, NOW())
            ON CONFLICT (id) DO UPDATE
            SET next_offset = GREATEST(update_cursor.next_offset, EXCLUDED.next_offset),
                updated_at = NOW()
            "#,
        )
        .bind(offset)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
