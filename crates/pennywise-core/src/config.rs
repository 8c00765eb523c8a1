//! Service configuration
//!
//! Everything the service reads from the environment is collected once at
//! startup into a [`ServiceConfig`] and passed down explicitly.
//!
//! | Variable                | Default     | Notes                                   |
//! |-------------------------|-------------|-----------------------------------------|
//! | `BACKEND_URL`           | (none)      | Upstream expense/budget API             |
//! | `APP_ENV` / `FLASK_ENV` | development | `production` enables origin allow-list  |
//! | `HOST`                  | 0.0.0.0     |                                         |
//! | `PORT` / `FLASK_PORT`   | 10000       |                                         |
//! | `ALLOWED_ORIGINS`       | (none)      | Comma-separated, production only        |
//! | `UPSTREAM_TIMEOUT_SECS` | 10          | Per-request timeout for upstream calls  |
//! | `CURRENCY_SYMBOL`       | ₹           | Used in suggestion messages             |

use std::time::Duration;

use tracing::warn;

use crate::analysis::DEFAULT_CURRENCY_SYMBOL;
use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 10000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(Error::Config(format!("Unknown environment: {}", other))),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL of the upstream backend (no trailing slash)
    pub backend_url: Option<String>,
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS in production (empty = any origin)
    pub allowed_origins: Vec<String>,
    pub upstream_timeout: Duration,
    pub currency_symbol: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            environment: Environment::Development,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            allowed_origins: vec![],
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Create from an arbitrary variable lookup (empty values count as unset)
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let backend_url = var("BACKEND_URL").map(|url| normalize_url(&url));
        if backend_url.is_none() {
            warn!("BACKEND_URL is not set; expense lookups will return no data");
        }

        // Unknown names fall back to development
        let environment = match var("APP_ENV").or_else(|| var("FLASK_ENV")) {
            Some(value) => value.parse().unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to {}", defaults.environment);
                defaults.environment
            }),
            None => defaults.environment,
        };

        let port = match var("PORT").or_else(|| var("FLASK_PORT")) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("Invalid port: {}", value)))?,
            None => defaults.port,
        };

        let upstream_timeout = match var("UPSTREAM_TIMEOUT_SECS") {
            Some(value) => {
                let secs: u64 = value
                    .trim()
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid upstream timeout: {}", value)))?;
                if secs == 0 {
                    return Err(Error::Config("Upstream timeout must be positive".into()));
                }
                Duration::from_secs(secs)
            }
            None => defaults.upstream_timeout,
        };

        Ok(Self {
            backend_url,
            environment,
            host: var("HOST").unwrap_or(defaults.host),
            port,
            allowed_origins: var("ALLOWED_ORIGINS")
                .map(|s| parse_origins(&s))
                .unwrap_or_default(),
            upstream_timeout,
            currency_symbol: var("CURRENCY_SYMBOL").unwrap_or(defaults.currency_symbol),
        })
    }

    /// Set the upstream backend URL
    pub fn with_backend_url(mut self, url: &str) -> Self {
        self.backend_url = Some(normalize_url(url));
        self
    }

    /// Origins to restrict CORS to, or `None` for a permissive policy
    ///
    /// Only production deployments with an explicit allow-list are restricted.
    pub fn cors_origins(&self) -> Option<&[String]> {
        if self.environment == Environment::Production && !self.allowed_origins.is_empty() {
            Some(&self.allowed_origins)
        } else {
            None
        }
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Parse a comma-separated list of origins
pub fn parse_origins(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
