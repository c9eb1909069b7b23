use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::ServerError;

/// Environment variable that overrides `[auth] jwt_secret`.
pub const JWT_SECRET_ENV: &str = "PANTRY_JWT_SECRET";

/// Top-level configuration loaded from `pantry.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct PantryConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Item and user store backend.
    #[serde(default)]
    pub store: StoreConfig,
    /// Token issuance and route protection.
    #[serde(default)]
    pub auth: AuthConfig,
}

impl PantryConfig {
    /// Read `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        if !path.exists() {
            info!(path = %path.display(), "config file not found, using defaults");
            return Self::parse("");
        }
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ServerError> {
        toml::from_str(contents).map_err(|e| ServerError::Config(e.to_string()))
    }
}

/// HTTP server bind configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// How long in-flight requests may run after a shutdown signal.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_seconds: default_shutdown_timeout(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
    3000
}

fn default_shutdown_timeout() -> u64 {
    30
}

/// Which store holds items and users.
#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    /// `"memory"` or `"postgres"`.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Connection URL for networked backends.
    pub url: Option<String>,
    /// Table name prefix.
    pub prefix: Option<String>,
    /// Maximum pooled connections.
    pub pool_size: Option<u32>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: None,
            prefix: None,
            pool_size: None,
        }
    }
}

fn default_backend() -> String {
    "memory".to_owned()
}

/// JWT settings and whether item routes require a token.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// HMAC signing secret. [`JWT_SECRET_ENV`] takes precedence.
    pub jwt_secret: Option<String>,
    /// Lifetime of issued tokens.
    #[serde(default = "default_jwt_expiry")]
    pub jwt_expiry_seconds: u64,
    /// Require a bearer token on protected routes and restrict callers to
    /// their own data.
    #[serde(default)]
    pub enforce: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_expiry_seconds: default_jwt_expiry(),
            enforce: false,
        }
    }
}

impl AuthConfig {
    /// Pick the signing secret: `env` wins over the file.
    ///
    /// Blank values count as absent. Fails when neither source has one.
    pub fn resolve_secret(&self, env: Option<String>) -> Result<String, ServerError> {
        env.into_iter()
            .chain(self.jwt_secret.clone())
            .find(|secret| !secret.trim().is_empty())
            .ok_or_else(|| {
                ServerError::Config(format!(
                    "no JWT signing secret: set {JWT_SECRET_ENV} or [auth] jwt_secret"
                ))
            })
    }
}

fn default_jwt_expiry() -> u64 {
    3600
}
