pub mod cookies;
pub mod credentials;
pub mod email;
pub mod tokens;
