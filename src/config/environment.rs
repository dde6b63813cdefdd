// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses environment variables into a strongly typed ServerConfig
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

//! Environment-based configuration management for production deployment

use std::env;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use foodgram_core::constants::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use tracing::warn;

/// Default HTTP port
pub const DEFAULT_HTTP_PORT: u16 = 8000;
/// Default bind address
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default database location
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/foodgram.db";
/// Default token lifetime
pub const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;
/// Default maximum request body (base64 images inflate uploads)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// SQLite database file
    SQLite {
        /// Path of the database file
        path: PathBuf,
    },
    /// In-memory SQLite (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string
    ///
    /// Accepts `sqlite:<path>`, `sqlite::memory:` and bare file paths.
    #[must_use]
    pub fn parse_url(s: &str) -> Self {
        let path_str = s.strip_prefix("sqlite://").or_else(|| s.strip_prefix("sqlite:"));
        match path_str.unwrap_or(s) {
            ":memory:" => Self::Memory,
            path => Self::SQLite {
                path: PathBuf::from(path),
            },
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::parse_url(DEFAULT_DATABASE_URL)
    }
}

impl Display for DatabaseUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Authentication settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for signing tokens
    pub jwt_secret: Vec<u8>,
    /// Token lifetime in hours
    pub jwt_expiry_hours: i64,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
}

/// Media storage settings
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Directory recipe images are written to
    pub root: PathBuf,
    /// URL prefix images are served under
    pub url_prefix: String,
}

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Maximum accepted request body
    pub max_body_bytes: usize,
    /// Allowed CORS origins, `*` means any
    pub cors_origins: Vec<String>,
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Deployment environment
    pub environment: Environment,
    /// HTTP server settings
    pub http: HttpConfig,
    /// Database location
    pub database_url: DatabaseUrl,
    /// Authentication settings
    pub auth: AuthConfig,
    /// Media storage settings
    pub media: MediaConfig,
    /// Default page size of paginated endpoints
    pub default_page_size: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed, or if
    /// `JWT_SECRET` is missing in production
    pub fn from_env() -> Result<Self> {
        let environment =
            Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development"));

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret.into_bytes(),
            _ if environment.is_production() => {
                bail!("JWT_SECRET must be set in production")
            }
            _ => {
                warn!("JWT_SECRET not set; generating an ephemeral secret, tokens will not survive restarts");
                crate::auth::generate_jwt_secret().to_vec()
            }
        };

        let default_page_size: u32 = parse_env("DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if default_page_size == 0 || default_page_size > MAX_PAGE_SIZE {
            bail!("DEFAULT_PAGE_SIZE must be between 1 and {MAX_PAGE_SIZE}");
        }

        Ok(Self {
            environment,
            http: HttpConfig {
                host: env_var_or("HOST", DEFAULT_HOST),
                port: parse_env("HTTP_PORT", DEFAULT_HTTP_PORT)?,
                max_body_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
                cors_origins: env_var_or("CORS_ALLOWED_ORIGINS", "*")
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_owned)
                    .collect(),
            },
            database_url: DatabaseUrl::parse_url(&env_var_or(
                "DATABASE_URL",
                DEFAULT_DATABASE_URL,
            )),
            auth: AuthConfig {
                jwt_secret,
                jwt_expiry_hours: parse_env("JWT_EXPIRY_HOURS", DEFAULT_JWT_EXPIRY_HOURS)?,
                bcrypt_cost: parse_env("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            },
            media: MediaConfig {
                root: PathBuf::from(env_var_or("MEDIA_ROOT", "./media")),
                url_prefix: normalize_prefix(&env_var_or("MEDIA_URL", "/media/")),
            },
            default_page_size,
        })
    }

    /// Configuration for tests: in-memory database, cheap hashing
    #[must_use]
    pub fn for_testing(media_root: PathBuf) -> Self {
        Self {
            environment: Environment::Testing,
            http: HttpConfig {
                host: "127.0.0.1".to_owned(),
                port: 0,
                max_body_bytes: DEFAULT_MAX_UPLOAD_BYTES,
                cors_origins: vec!["*".to_owned()],
            },
            database_url: DatabaseUrl::Memory,
            auth: AuthConfig {
                jwt_secret: crate::auth::generate_jwt_secret().to_vec(),
                jwt_expiry_hours: DEFAULT_JWT_EXPIRY_HOURS,
                bcrypt_cost: 4,
            },
            media: MediaConfig {
                root: media_root,
                url_prefix: "/media/".to_owned(),
            },
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// One-line-per-setting summary for startup logs (no secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Foodgram Server Configuration:\n\
             - Environment: {}\n\
             - Listen: {}:{}\n\
             - Database: {}\n\
             - Media root: {} (served under {})\n\
             - Token lifetime: {}h\n\
             - Default page size: {}\n\
             - CORS origins: {}",
            self.environment,
            self.http.host,
            self.http.port,
            self.database_url,
            self.media.root.display(),
            self.media.url_prefix,
            self.auth.jwt_expiry_hours,
            self.default_page_size,
            self.http.cors_origins.join(", "),
        )
    }
}

/// Read an environment variable, falling back to a default
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an optional environment variable, falling back to a default when unset
fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key} value: {value}")),
        Err(_) => Ok(default),
    }
}

/// Ensure a URL prefix starts and ends with `/`
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else {
        format!("/{trimmed}/")
    }
}
