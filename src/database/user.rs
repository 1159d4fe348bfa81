use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::user::{Role, User};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, is_verified, verified_at, \
     verification_token_hash, reset_token_hash, reset_token_expires_at, created_at";

impl PostgresRepository {
    /// `password_hash` and `verification_token_hash` are computed by the
    /// caller (CredentialService / sha256); the store never hashes anything.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
        verification_token_hash: &str,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, role, verification_token_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .bind(verification_token_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn count_users(&self) -> Result<i64, AppError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users").fetch_one(&self.pool).await?;

        Ok(count.0)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE email = $1
            "#
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_user_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn list_users_with_role(&self, role: Role) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE role = $1
            ORDER BY created_at
            "#
        ))
        .bind(role)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Flip the account to verified and clear the one-time token in one write.
    pub async fn mark_email_verified(&self, user_id: &Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET is_verified = TRUE, verified_at = now(), verification_token_hash = NULL
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn set_password_reset(
        &self,
        user_id: &Uuid,
        reset_token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET reset_token_hash = $1, reset_token_expires_at = $2
            WHERE id = $3
            "#,
        )
        .bind(reset_token_hash)
        .bind(expires_at)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Set the new password and clear both reset columns, making the reset
    /// token single-use.
    pub async fn reset_password(&self, user_id: &Uuid, password_hash: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $1, reset_token_hash = NULL, reset_token_expires_at = NULL
            WHERE id = $2
            "#,
        )
        .bind(password_hash)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn update_user_password(&self, user_id: &Uuid, password_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn update_user_profile(&self, id: &Uuid, name: &str, email: &str) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = $1, email = $2
            WHERE id = $3
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(email)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }
}
