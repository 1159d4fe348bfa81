use rocket::serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::{Role, User};

/// The identity embedded in signed tokens and attached to request context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenUser {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub name: String,
    pub role: Role,
}

impl From<&User> for TokenUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// Access token claims: identity only, short validity window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub user: TokenUser,
}

/// Refresh token claims: identity plus the session secret that must match the
/// persisted session row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub user: TokenUser,
    #[serde(rename = "refreshToken")]
    pub refresh_secret: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_user_serializes_with_wire_field_names() {
        let user = TokenUser {
            user_id: Uuid::nil(),
            name: "peter".to_string(),
            role: Role::Admin,
        };
        let json = serde_json::to_value(&RefreshClaims {
            user,
            refresh_secret: "s3cret".to_string(),
        })
        .unwrap();
        assert!(json["user"]["userId"].is_string());
        assert_eq!(json["user"]["role"], "admin");
        assert_eq!(json["refreshToken"], "s3cret");
    }
}
