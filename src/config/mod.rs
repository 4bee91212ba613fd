use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Origin the web client is served from; used for CORS and for the
    /// password-reset links embedded in emails.
    #[serde(default = "default_client_url")]
    pub client_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            client_url: default_client_url(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_client_url() -> String {
    "http://localhost:3000".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign session tokens.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Standard session token lifetime in days.
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: i64,
    /// Session token lifetime in days when the client asks to stay signed in.
    #[serde(default = "default_remember_me_ttl_days")]
    pub remember_me_ttl_days: i64,
    /// Password-reset token lifetime in minutes.
    #[serde(default = "default_reset_token_ttl_minutes")]
    pub reset_token_ttl_minutes: i64,
    /// Set the Secure attribute on the session cookie (enable behind TLS).
    #[serde(default)]
    pub cookie_secure: bool,
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_days: default_token_ttl_days(),
            remember_me_ttl_days: default_remember_me_ttl_days(),
            reset_token_ttl_minutes: default_reset_token_ttl_minutes(),
            cookie_secure: false,
            admin_email: default_admin_email(),
            admin_password: default_admin_password(),
        }
    }
}

fn default_jwt_secret() -> String {
    // Fall back to the environment, then to a random per-process secret
    std::env::var("CATERPRO_JWT_SECRET").unwrap_or_else(|_| uuid::Uuid::new_v4().to_string())
}

fn default_token_ttl_days() -> i64 {
    30
}

fn default_remember_me_ttl_days() -> i64 {
    90
}

fn default_reset_token_ttl_minutes() -> i64 {
    30
}

fn default_admin_email() -> String {
    "admin@caterpro.local".to_string()
}

fn default_admin_password() -> String {
    // Generate a random password if not provided
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    #[serde(default = "default_smtp_tls")]
    pub smtp_tls: bool,
    pub from_address: Option<String>,
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

impl EmailConfig {
    /// Check whether enough is configured to actually send mail
    pub fn is_configured(&self) -> bool {
        self.smtp_host.is_some() && self.from_address.is_some()
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
            smtp_tls: default_smtp_tls(),
            from_address: None,
            from_name: default_from_name(),
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_tls() -> bool {
    true
}

fn default_from_name() -> String {
    "CaterPro".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,
    /// General API requests allowed per window per client IP
    #[serde(default = "default_api_requests_per_window")]
    pub api_requests_per_window: u32,
    /// Auth requests (login, register, password flows) per window per IP
    #[serde(default = "default_auth_requests_per_window")]
    pub auth_requests_per_window: u32,
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
    /// Seconds between sweeps of stale rate-limit entries
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            api_requests_per_window: default_api_requests_per_window(),
            auth_requests_per_window: default_auth_requests_per_window(),
            window_seconds: default_window_seconds(),
            cleanup_interval: default_cleanup_interval(),
        }
    }
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_api_requests_per_window() -> u32 {
    100
}

fn default_auth_requests_per_window() -> u32 {
    20
}

fn default_window_seconds() -> u64 {
    60
}

fn default_cleanup_interval() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            email: EmailConfig::default(),
            rate_limit: RateLimitConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config =
                toml::from_str(&content).with_context(|| "Failed to parse configuration file")?;
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}
