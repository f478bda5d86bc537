use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_INTERNAL_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_CURRENCY: &str = "usd";
const DEFAULT_HTTP_CLIENT_TIMEOUT_SECS: u64 = 10;

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Base URL of the remote backend API (catalog, payments, orders)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Own origin, used to resolve internal `/api/`-prefixed endpoints
    #[serde(default = "default_internal_base_url")]
    pub internal_base_url: String,

    /// Payment provider publishable client key. Absence is a deployment
    /// misconfiguration surfaced by the checkout flow, not a startup error.
    #[serde(default)]
    pub stripe_publishable_key: Option<String>,

    /// Identity provider base URL for the server-side session token API
    #[serde(default)]
    pub auth_base_url: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Default currency for checkout when the query omits one
    #[serde(default = "default_currency")]
    #[validate(custom = "validate_currency")]
    pub default_currency: String,

    /// Timeout applied to every outbound HTTP call (seconds)
    #[serde(default = "default_http_client_timeout_secs")]
    #[validate(custom = "validate_timeout")]
    pub http_client_timeout_secs: u64,

    /// CORS: comma-separated list of allowed origins (production)
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow permissive CORS fallback
    #[serde(default)]
    pub cors_allow_any_origin: bool,

    /// CORS: allow credentials
    #[serde(default)]
    pub cors_allow_credentials: bool,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}
fn default_internal_base_url() -> String {
    DEFAULT_INTERNAL_BASE_URL.to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}
fn default_http_client_timeout_secs() -> u64 {
    DEFAULT_HTTP_CLIENT_TIMEOUT_SECS
}

fn validate_currency(currency: &str) -> Result<(), ValidationError> {
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("currency");
        err.message = Some("default_currency must be a 3-letter ISO code".into());
        Err(err)
    }
}

fn validate_timeout(secs: u64) -> Result<(), ValidationError> {
    if secs == 0 {
        let mut err = ValidationError::new("timeout");
        err.message = Some("http_client_timeout_secs must be greater than 0".into());
        return Err(err);
    }
    Ok(())
}

impl AppConfig {
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
            || self.environment.eq_ignore_ascii_case("dev")
    }

    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    /// Constraints that span multiple fields and can't be expressed as
    /// per-field validators.
    pub fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.is_development()
            && self.cors_allowed_origins.is_none()
            && !self.cors_allow_any_origin
        {
            let mut err = ValidationError::new("cors");
            err.message = Some(
                "non-development environments require cors_allowed_origins or cors_allow_any_origin"
                    .into(),
            );
            errors.add("cors_allowed_origins", err);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),
    #[error("Configuration validation failed: {0}")]
    Validation(ValidationErrors),
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("storefront_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Default config (config/default.toml)
/// 2. Environment-specific config (config/{env}.toml)
/// 3. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("api_base_url", DEFAULT_API_BASE_URL)?
        .set_default("internal_base_url", DEFAULT_INTERNAL_BASE_URL)?
        .set_default("host", "0.0.0.0")?
        .set_default("port", DEFAULT_PORT as i64)?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .set_default("default_currency", DEFAULT_CURRENCY)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    app_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration security validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    if app_config.stripe_publishable_key.is_none() {
        // Startup still succeeds; the checkout flow renders a config-error
        // screen until the key is provided.
        error!("stripe_publishable_key is not configured; checkout will be unavailable");
    }

    info!("Configuration loaded successfully");
    Ok(app_config)
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        api_base_url: DEFAULT_API_BASE_URL.into(),
        internal_base_url: DEFAULT_INTERNAL_BASE_URL.into(),
        stripe_publishable_key: Some("pk_test_123".into()),
        auth_base_url: None,
        host: "127.0.0.1".into(),
        port: DEFAULT_PORT,
        environment: "development".into(),
        log_level: DEFAULT_LOG_LEVEL.into(),
        log_json: false,
        default_currency: DEFAULT_CURRENCY.into(),
        http_client_timeout_secs: DEFAULT_HTTP_CLIENT_TIMEOUT_SECS,
        cors_allowed_origins: None,
        cors_allow_any_origin: false,
        cors_allow_credentials: false,
    }
}

#[cfg(test)]
mod cors_validation_tests {
    use super::*;

    fn production_config() -> AppConfig {
        let mut cfg = test_config();
        cfg.environment = "production".into();
        cfg
    }

    #[test]
    fn non_dev_requires_cors_origins() {
        let cfg = production_config();
        assert!(cfg.validate_additional_constraints().is_err());
    }

    #[test]
    fn non_dev_allows_override_flag() {
        let mut cfg = production_config();
        cfg.cors_allow_any_origin = true;
        assert!(cfg.validate_additional_constraints().is_ok());
    }

    #[test]
    fn non_dev_with_origins_passes() {
        let mut cfg = production_config();
        cfg.cors_allowed_origins = Some("https://shop.example.com".into());
        assert!(cfg.validate_additional_constraints().is_ok());
    }

    #[test]
    fn development_allows_permissive_by_default() {
        let cfg = test_config();
        assert!(cfg.validate_additional_constraints().is_ok());
        assert!(cfg.should_allow_permissive_cors());
    }
}
