use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One revocable refresh-session row per user. `secret` is the opaque random
/// value a refresh token must present to be honored; deleting the row revokes
/// the refresh token regardless of its cryptographic validity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub secret: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
