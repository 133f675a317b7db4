use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::RepositoryError;
use crate::models::User;
use crate::repositories::traits::{MatchCommit, Teardown, UserStore};

const USER_COLUMNS: &str = "id, chat_id, available, match_chat_id, previous_match, \
     allow_pictures, last_activity, register_date, banned_until";

/// Repository for user data access
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_if_absent(&self, chat_id: i64) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (chat_id, available, allow_pictures)
            VALUES ($1, FALSE, TRUE)
            ON CONFLICT (chat_id) DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_chat_id(&self, chat_id: i64) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE chat_id = $1"
        ))
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_or_create(&self, chat_id: i64) -> Result<(User, bool), RepositoryError> {
        // Known chats skip the INSERT and keep the id sequence untouched
        if let Some(user) = self.find_by_chat_id(chat_id).await? {
            return Ok((user, false));
        }

        // The unique key on chat_id settles concurrent first contacts: exactly
        // one INSERT returns a row, the others fall through to the SELECT.
        if let Some(user) = self.insert_if_absent(chat_id).await? {
            return Ok((user, true));
        }

        let user = self
            .find_by_chat_id(chat_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("user with chat {}", chat_id)))?;

        Ok((user, false))
    }

    async fn find_searching_except(&self, chat_id: i64) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE chat_id <> $1 AND available = TRUE AND match_chat_id IS NULL
            "#
        ))
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn find_all_searching(&self) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE available = TRUE AND match_chat_id IS NULL
            ORDER BY last_activity
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn begin_search(&self, chat_id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET available = TRUE
            WHERE chat_id = $1 AND available = FALSE AND match_chat_id IS NULL
            "#,
        )
        .bind(chat_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn commit_match(
        &self,
        requester_chat_id: i64,
        partner_chat_id: i64,
    ) -> Result<MatchCommit, RepositoryError> {
        if requester_chat_id == partner_chat_id {
            return Ok(MatchCommit::PartnerUnavailable);
        }

        let mut tx = self.pool.begin().await?;

        // Lock both rows in chat_id order so concurrent commits cannot deadlock
        let rows = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE chat_id = ANY($1)
            ORDER BY chat_id
            FOR UPDATE
            "#
        ))
        .bind(vec![requester_chat_id, partner_chat_id])
        .fetch_all(&mut *tx)
        .await?;

        let searching = |chat_id: i64| {
            rows.iter()
                .any(|u| u.chat_id == chat_id && u.is_searching())
        };

        if !searching(requester_chat_id) {
            tx.rollback().await?;
            return Ok(MatchCommit::RequesterUnavailable);
        }

        if !searching(partner_chat_id) {
            tx.rollback().await?;
            return Ok(MatchCommit::PartnerUnavailable);
        }

        let query = "UPDATE users SET match_chat_id = $1 WHERE chat_id = $2";

        sqlx::query(query)
            .bind(requester_chat_id)
            .bind(partner_chat_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(query)
            .bind(partner_chat_id)
            .bind(requester_chat_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(MatchCommit::Committed)
    }

    async fn end_conversation(&self, chat_id: i64) -> Result<Teardown, RepositoryError> {
        loop {
            let seen = self
                .find_by_chat_id(chat_id)
                .await?
                .ok_or_else(|| RepositoryError::NotFound(format!("user with chat {}", chat_id)))?;

            let mut tx = self.pool.begin().await?;

            // Same lock order as commit_match, so two partners ending at once cannot deadlock
            let locked = sqlx::query_as::<_, User>(&format!(
                r#"
                SELECT {USER_COLUMNS}
                FROM users
                WHERE chat_id = ANY($1)
                ORDER BY chat_id
                FOR UPDATE
                "#
            ))
            .bind(seen.match_chat_id.into_iter().chain([chat_id]).collect::<Vec<i64>>())
            .fetch_all(&mut *tx)
            .await?;

            let Some(user) = locked.iter().find(|u| u.chat_id == chat_id) else {
                tx.rollback().await?;
                return Err(RepositoryError::NotFound(format!("user with chat {}", chat_id)));
            };

            // Rematched between the read and the lock: the partner row is not held
            if user.match_chat_id != seen.match_chat_id {
                tx.rollback().await?;
                continue;
            }

            let outcome = match user.match_chat_id {
                Some(partner_chat_id) => {
                    sqlx::query(
                        r#"
                        UPDATE users
                        SET match_chat_id = NULL, available = FALSE, previous_match = $1
                        WHERE chat_id = $2
                        "#,
                    )
                    .bind(partner_chat_id)
                    .bind(chat_id)
                    .execute(&mut *tx)
                    .await?;

                    // Only unwind the partner if it still points back at us
                    sqlx::query(
                        r#"
                        UPDATE users
                        SET match_chat_id = NULL, available = FALSE, previous_match = $1
                        WHERE chat_id = $2 AND match_chat_id = $1
                        "#,
                    )
                    .bind(chat_id)
                    .bind(partner_chat_id)
                    .execute(&mut *tx)
                    .await?;

                    Teardown::Ended { partner_chat_id }
                }
                None => {
                    sqlx::query("UPDATE users SET available = FALSE WHERE chat_id = $1")
                        .bind(chat_id)
                        .execute(&mut *tx)
                        .await?;

                    Teardown::Cancelled
                }
            };

            tx.commit().await?;

            return Ok(outcome);
        }
    }

    async fn toggle_allow_pictures(&self, user_id: i64) -> Result<bool, RepositoryError> {
        let allow: bool = sqlx::query_scalar(
            r#"
            UPDATE users
            SET allow_pictures = NOT allow_pictures
            WHERE id = $1
            RETURNING allow_pictures
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(allow)
    }

    async fn touch_last_activity(&self, user_id: i64) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET last_activity = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn ban_until(
        &self,
        chat_id: i64,
        until: Option<DateTime<Utc>>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE users SET banned_until = $1 WHERE chat_id = $2")
            .bind(until)
            .bind(chat_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
