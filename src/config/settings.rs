use std::env;
use std::path::PathBuf;
use tracing::warn;

/// Variables the application refuses to start without.
pub const REQUIRED_ENV_VARS: [&str; 2] = ["DATABASE_URL", "JWT_SECRET"];

/// Variables whose presence the health endpoint reports. Includes the
/// hosted-service credentials operators keep in the same environment.
pub const REPORTED_ENV_VARS: [&str; 9] = [
    "DATABASE_URL",
    "JWT_SECRET",
    "BASE_URL",
    "ADMIN_EMAIL",
    "SMTP_HOST",
    "SMTP_USERNAME",
    "SMTP_PASSWORD",
    "SUPABASE_URL",
    "SUPABASE_SERVICE_ROLE_KEY",
];

const DEFAULT_JWT_TTL_HOURS: i64 = 24;
/// One year; larger lifetimes overflow the expiry timestamp arithmetic.
const MAX_JWT_TTL_HOURS: i64 = 24 * 365;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_CONTRACTS_DIR: &str = "./data/contracts";
const MIN_PRODUCTION_SECRET_LEN: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub base_url: String,
    pub admin_email: String,
    pub contracts_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub environment: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let config = AppConfig {
            database_url,
            jwt_secret,
            jwt_ttl_hours: parsed("JWT_TTL_HOURS", DEFAULT_JWT_TTL_HOURS)?,
            base_url: env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string())
                .trim_end_matches('/')
                .to_string(),
            admin_email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@localhost".to_string()),
            contracts_dir: env::var("CONTRACTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONTRACTS_DIR)),
            max_upload_bytes: parsed("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            environment,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT", 8080u16)?,
        };

        if !(1..=MAX_JWT_TTL_HOURS).contains(&config.jwt_ttl_hours) {
            return Err(ConfigError::Invalid {
                name: "JWT_TTL_HOURS",
                value: config.jwt_ttl_hours.to_string(),
            });
        }

        if config.is_production() && config.jwt_secret.len() < MIN_PRODUCTION_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: "JWT_SECRET",
                value: format!("<{} characters>", config.jwt_secret.len()),
            });
        }

        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Logs configuration that is acceptable in development but risky once
    /// deployed.
    pub fn warn_on_insecure_settings(&self) {
        if !self.is_production() {
            return;
        }
        if !self.base_url.starts_with("https://") {
            warn!("BASE_URL is not https in production: {}", self.base_url);
        }
        if self.admin_email.ends_with("@localhost") {
            warn!("ADMIN_EMAIL is not configured; notifications go to {}", self.admin_email);
        }
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Presence of each reported variable, in declaration order.
pub fn env_presence() -> Vec<(&'static str, bool)> {
    REPORTED_ENV_VARS
        .iter()
        .map(|name| {
            let present = env::var(name).map(|v| !v.trim().is_empty()).unwrap_or(false);
            (*name, present)
        })
        .collect()
}
