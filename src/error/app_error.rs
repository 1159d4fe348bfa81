use rocket::http::{ContentType, Status};
use rocket::response::Responder;
use rocket::{Request, Response};
use std::io::Cursor;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    /// Uniform login failure. Unknown account and wrong password produce the
    /// same message so neither can be distinguished from the outside.
    #[error("Invalid Credentials")]
    InvalidCredentials,
    /// Uniform gate/verification failure. Every rejection path in the
    /// authentication gate maps here regardless of which check failed.
    #[error("Authentication Failed!")]
    AuthenticationFailed,
    #[error("Please verify your Email!")]
    EmailNotVerified,
    /// Ownership check failed for a non-admin caller.
    #[error("Not Authorized to access this route")]
    NotAuthorized,
    /// Role check failed.
    #[error("Unauthorized to access this route")]
    Forbidden,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Duplicate value entered for {0} field, please choose another value")]
    DuplicateKey(String),
    #[error("{}", format_validation_errors(.0))]
    Validation(#[from] ValidationErrors),
    #[error("Internal server error")]
    Db {
        message: String,
        #[source]
        source: sqlx::error::Error,
    },
    #[error("Internal server error")]
    PasswordHash { message: String },
    #[error("Internal server error")]
    TokenEncoding { message: String },
    #[error("Internal server error")]
    Email { message: String },
    #[error("Internal server error")]
    Configuration {
        message: String,
        #[source]
        source: figment::Error,
    },
}

/// Aggregate every field failure into a single message, matching the
/// one-line-per-request error contract of the API.
fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

impl AppError {
    pub fn db(message: impl Into<String>, source: sqlx::error::Error) -> Self {
        Self::Db {
            message: message.into(),
            source,
        }
    }

    pub fn password_hash(message: impl Into<String>, source: password_hash::Error) -> Self {
        Self::PasswordHash {
            message: format!("{}: {}", message.into(), source),
        }
    }

    pub fn email(message: impl Into<String>) -> Self {
        Self::Email { message: message.into() }
    }
}

impl From<password_hash::Error> for AppError {
    fn from(e: password_hash::Error) -> Self {
        AppError::password_hash("Password hashing failed", e)
    }
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::Configuration {
            message: "Failed to read configuration".to_string(),
            source: e,
        }
    }
}

/// Translate a unique-constraint name into the field the caller supplied, so
/// the duplicate-key message names `email` rather than `users_email_key`.
fn constraint_field(constraint: &str) -> String {
    match constraint {
        "users_email_key" => "email".to_string(),
        "sessions_user_id_key" => "user_id".to_string(),
        other => other.to_string(),
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                let field = db_err
                    .constraint()
                    .map(constraint_field)
                    .unwrap_or_else(|| "unique".to_string());
                AppError::DuplicateKey(field)
            }
            _ => AppError::db("Database error", e),
        }
    }
}

impl From<&AppError> for Status {
    fn from(e: &AppError) -> Self {
        match e {
            AppError::BadRequest(_) => Status::BadRequest,
            AppError::InvalidCredentials => Status::Unauthorized,
            AppError::AuthenticationFailed => Status::Unauthorized,
            AppError::EmailNotVerified => Status::Unauthorized,
            AppError::NotAuthorized => Status::Unauthorized,
            AppError::Forbidden => Status::Forbidden,
            AppError::NotFound(_) => Status::NotFound,
            AppError::DuplicateKey(_) => Status::BadRequest,
            AppError::Validation(_) => Status::BadRequest,
            AppError::Db { .. } => Status::InternalServerError,
            AppError::PasswordHash { .. } => Status::InternalServerError,
            AppError::TokenEncoding { .. } => Status::InternalServerError,
            AppError::Email { .. } => Status::InternalServerError,
            AppError::Configuration { .. } => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &Request<'_>) -> rocket::response::Result<'static> {
        // Extract request context for better error logging
        let method = req.method();
        let uri = req.uri();

        // Try to get request_id from local_cache
        let request_id = req
            .local_cache(|| None::<crate::middleware::RequestId>)
            .as_ref()
            .map(|r| r.0.as_str())
            .unwrap_or("unknown");

        // Try to get user from auth
        let user_id = req
            .local_cache(|| None::<crate::auth::CurrentUser>)
            .as_ref()
            .map(|u| u.id.to_string())
            .unwrap_or_else(|| "anonymous".to_string());

        error!(
            error = ?self,
            request_id = %request_id,
            user_id = %user_id,
            method = %method,
            uri = %uri,
            "request failed"
        );

        let status = Status::from(&self);
        let body = serde_json::json!({
            "status": "fail",
            "msg": self.to_string(),
        })
        .to_string();

        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 3, message = "name must be at least 3 characters"))]
        name: String,
        #[validate(email(message = "Provide a valid email address"))]
        email: String,
    }

    #[test]
    fn validation_messages_aggregate_all_fields() {
        let probe = Probe {
            name: "ab".to_string(),
            email: "nope".to_string(),
        };
        let err = AppError::from(probe.validate().unwrap_err());
        let msg = err.to_string();
        assert!(msg.contains("name must be at least 3 characters"));
        assert!(msg.contains("Provide a valid email address"));
        assert_eq!(Status::from(&err), Status::BadRequest);
    }

    #[test]
    fn gate_failures_share_a_single_message() {
        assert_eq!(AppError::AuthenticationFailed.to_string(), "Authentication Failed!");
        assert_eq!(Status::from(&AppError::AuthenticationFailed), Status::Unauthorized);
        assert_eq!(Status::from(&AppError::InvalidCredentials), Status::Unauthorized);
    }

    #[test]
    fn role_and_ownership_failures_map_to_distinct_statuses() {
        assert_eq!(Status::from(&AppError::Forbidden), Status::Forbidden);
        assert_eq!(Status::from(&AppError::NotAuthorized), Status::Unauthorized);
    }

    #[test]
    fn duplicate_key_message_names_the_field_not_the_constraint() {
        assert_eq!(constraint_field("users_email_key"), "email");
        assert_eq!(constraint_field("sessions_user_id_key"), "user_id");
        let msg = AppError::DuplicateKey(constraint_field("users_email_key")).to_string();
        assert_eq!(msg, "Duplicate value entered for email field, please choose another value");
    }

    #[test]
    fn row_not_found_maps_to_404() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert_eq!(Status::from(&err), Status::NotFound);
    }
}
