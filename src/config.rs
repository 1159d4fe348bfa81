use rocket::figment::{Figment, providers::{Env, Format, Toml}};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
    pub email: EmailConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout: u64,
    pub acquire_timeout: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub address: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Everything the identity core needs from the environment, passed explicitly
/// into the credential, token and cookie services at construction.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    /// HMAC key for access/refresh token signatures.
    pub signing_secret: String,
    /// Key for Rocket's private (signed + encrypted) cookies. Forwarded into
    /// Rocket's `secret_key`; must be at least 32 bytes outside of tests.
    pub cookie_signing_secret: String,
    /// Access token validity window in minutes.
    pub access_ttl_minutes: i64,
    /// Refresh cookie lifetime in hours. The refresh token's own expiry is
    /// set past this so the cookie is the effective gate.
    pub refresh_cookie_ttl_hours: i64,
    /// Password reset token validity in minutes.
    pub reset_token_ttl_minutes: i64,
    /// Argon2 time cost used when hashing passwords.
    pub hash_cost: u32,
    /// Set the `Secure` flag on session cookies.
    pub secure_cookies: bool,
    /// Base URL used when building verification/reset links in emails.
    pub frontend_origin: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
    pub from_name: String,
    pub enabled: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/storefront_db".to_string(),
            max_connections: 16,
            min_connections: 4,
            connection_timeout: 5,
            acquire_timeout: 5,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            address: "127.0.0.1".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            allow_credentials: true,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing_secret: String::new(),
            cookie_signing_secret: String::new(),
            access_ttl_minutes: 15,
            refresh_cookie_ttl_hours: 24,
            reset_token_ttl_minutes: 10,
            hash_cost: 2,
            secure_cookies: false,
            frontend_origin: "http://localhost:3000".to_string(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_address: "noreply@storefront.local".to_string(),
            from_name: "Storefront".to_string(),
            enabled: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            cors: CorsConfig::default(),
            auth: AuthConfig::default(),
            email: EmailConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. Storefront.toml (base configuration file)
    /// 2. Environment variables (prefixed with STOREFRONT_)
    /// 3. DATABASE_URL environment variable (for backwards compatibility)
    pub fn load() -> Result<Self, figment::Error> {
        let figment = Figment::new()
            // Start with defaults
            .merge(Toml::string(&toml::to_string(&Config::default()).unwrap()).nested())
            // Layer on Storefront.toml if it exists
            .merge(Toml::file("Storefront.toml").nested())
            // Layer on environment variables (e.g., STOREFRONT_DATABASE_URL)
            .merge(Env::prefixed("STOREFRONT_").split("_"))
            // Special case: DATABASE_URL for backwards compatibility
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()));

        figment.extract()
    }
}
