use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// Full user row. The password hash never leaves the database layer; every
/// response goes through [`UserResponse`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub verification_token_hash: Option<String>,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "user name between 3 to 50 characters"))]
    pub name: String,
    #[validate(email(message = "Provide Valid email ID"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email or Password is missing"))]
    pub email: String,
    #[validate(length(min = 1, message = "Email or Password is missing"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyEmailRequest {
    #[validate(email(message = "Provide Valid email ID"))]
    pub email: String,
    #[serde(rename = "verificationToken")]
    #[validate(length(min = 1, message = "Verification token is missing"))]
    pub verification_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Provide Valid email ID"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Reset token is missing"))]
    pub token: String,
    #[validate(email(message = "Provide Valid email ID"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    #[serde(rename = "oldPassword")]
    #[validate(length(min = 1, message = "Either old password or new password is missing"))]
    pub old_password: String,
    #[serde(rename = "newPassword")]
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    #[validate(custom(function = "validate_password_strength"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 50, message = "user name between 3 to 50 characters"))]
    pub name: String,
    #[validate(email(message = "Provide Valid email ID"))]
    pub email: String,
}

/// Reject passwords zxcvbn scores as trivially guessable.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let estimate = zxcvbn::zxcvbn(password, &[]);
    if estimate.score() < zxcvbn::Score::Two {
        return Err(ValidationError::new("password_strength")
            .with_message("password is too easy to guess".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_rejects_short_name_and_bad_email() {
        let req = RegisterRequest {
            name: "ab".to_string(),
            email: "not-an-email".to_string(),
            password: "correct-horse-battery".to_string(),
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn register_rejects_weak_password() {
        let req = RegisterRequest {
            name: "peter".to_string(),
            email: "peter@example.com".to_string(),
            password: "123456".to_string(),
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn register_accepts_reasonable_input() {
        let req = RegisterRequest {
            name: "peter".to_string(),
            email: "peter@example.com".to_string(),
            password: "tr0mb0ne-picnic-42".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn user_response_omits_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            name: "peter".to_string(),
            email: "peter@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            role: Role::User,
            is_verified: true,
            verified_at: Some(Utc::now()),
            verification_token_hash: None,
            reset_token_hash: None,
            reset_token_expires_at: None,
            created_at: Utc::now(),
        };
        let body = serde_json::to_string(&UserResponse::from(&user)).unwrap();
        assert!(!body.contains("argon2"));
        assert!(body.contains("peter@example.com"));
        assert!(body.contains("\"role\":\"user\""));
    }
}
