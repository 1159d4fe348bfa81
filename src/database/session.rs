use uuid::Uuid;

use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::session::Session;

impl PostgresRepository {
    pub async fn find_session_by_user(&self, user_id: &Uuid) -> Result<Option<Session>, AppError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, secret, ip, user_agent, is_valid, created_at, updated_at
            FROM sessions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Atomic find-or-create keyed on the unique `user_id` index. When a row
    /// already exists it is touched, not replaced: the stored secret wins and
    /// the caller must use the returned one. Two concurrent first logins for
    /// the same user therefore converge on a single session row.
    pub async fn upsert_session(
        &self,
        user_id: &Uuid,
        secret: &str,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> Result<Session, AppError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, secret, ip, user_agent)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = now()
            RETURNING id, user_id, secret, ip, user_agent, is_valid, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(secret)
        .bind(ip)
        .bind(user_agent)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// Idempotent; logout calls this unconditionally.
    pub async fn delete_sessions_by_user(&self, user_id: &Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
