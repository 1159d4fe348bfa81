use rocket::serde::Serialize;

use crate::models::token::TokenUser;
use crate::models::user::UserResponse;

/// Generic success acknowledgement: `{"status":"success","msg":...}`.
#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub status: &'static str,
    pub msg: String,
}

impl ApiMessage {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            status: "success",
            msg: msg.into(),
        }
    }
}

/// Success payload carrying the caller identity, returned by every endpoint
/// that also writes session cookies.
#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub status: &'static str,
    pub data: IdentityData,
}

#[derive(Debug, Serialize)]
pub struct IdentityData {
    pub user: TokenUser,
}

impl IdentityResponse {
    pub fn new(user: TokenUser) -> Self {
        Self {
            status: "success",
            data: IdentityData { user },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub status: &'static str,
    pub results: usize,
    pub data: UsersData,
}

#[derive(Debug, Serialize)]
pub struct UsersData {
    pub users: Vec<UserResponse>,
}

impl UsersResponse {
    pub fn new(users: Vec<UserResponse>) -> Self {
        Self {
            status: "success",
            results: users.len(),
            data: UsersData { users },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub status: &'static str,
    pub data: UserData,
}

#[derive(Debug, Serialize)]
pub struct UserData {
    pub user: UserResponse,
}

impl UserEnvelope {
    pub fn new(user: UserResponse) -> Self {
        Self {
            status: "success",
            data: UserData { user },
        }
    }
}
