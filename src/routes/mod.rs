pub mod auth;
pub mod error;
pub mod health;
pub mod user;
