use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::workflows::alerts::dispatcher::DispatchSettings;

const DEV_JWT_SECRET: &str = "dev-only-secret-change-me";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_FROM_ADDRESS: &str = "noreply@freejobalert.com";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub auth: AuthConfig,
    pub alerts: AlertConfig,
    /// `None` when `SMTP_HOST` is unset; outbound e-mail is then disabled.
    pub email: Option<EmailConfig>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            auth: AuthConfig::load(environment)?,
            alerts: AlertConfig::load()?,
            email: EmailConfig::load()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Token signing and the optional bootstrap administrator.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub admin: Option<AdminBootstrap>,
}

#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

impl AuthConfig {
    fn load(environment: AppEnvironment) -> Result<Self, ConfigError> {
        let jwt_secret = match env::var("APP_JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if environment == AppEnvironment::Production => {
                return Err(ConfigError::MissingJwtSecret)
            }
            _ => DEV_JWT_SECRET.to_string(),
        };

        let token_ttl_minutes = parse_var("APP_TOKEN_TTL_MINUTES", 30_i64)?;
        if token_ttl_minutes <= 0 {
            return Err(ConfigError::InvalidNumber {
                name: "APP_TOKEN_TTL_MINUTES",
                value: token_ttl_minutes.to_string(),
            });
        }

        let admin = match (env::var("APP_ADMIN_EMAIL"), env::var("APP_ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(AdminBootstrap { email, password }),
            (Err(_), Err(_)) => None,
            _ => return Err(ConfigError::IncompleteAdmin),
        };

        Ok(Self {
            jwt_secret,
            token_ttl_minutes,
            admin,
        })
    }
}

/// Matching and dispatch limits for job alerts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertConfig {
    pub concurrency: usize,
    pub queue_depth: usize,
    pub page_size: usize,
    /// `None` disables the soft cap.
    pub candidate_cap: Option<usize>,
    pub send_timeout_secs: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            queue_depth: 64,
            page_size: 200,
            candidate_cap: Some(1000),
            send_timeout_secs: 10,
        }
    }
}

impl AlertConfig {
    fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let cap = parse_var("ALERTS_CANDIDATE_CAP", 1000_usize)?;
        Ok(Self {
            concurrency: parse_positive("ALERTS_CONCURRENCY", defaults.concurrency)?,
            queue_depth: parse_positive("ALERTS_QUEUE_DEPTH", defaults.queue_depth)?,
            page_size: parse_positive("ALERTS_PAGE_SIZE", defaults.page_size)?,
            candidate_cap: (cap > 0).then_some(cap),
            send_timeout_secs: parse_positive("ALERTS_SEND_TIMEOUT_SECS", defaults.send_timeout_secs)?,
        })
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }

    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            concurrency: self.concurrency,
            queue_depth: self.queue_depth,
            send_timeout: self.send_timeout(),
        }
    }
}

/// SMTP relay used for alerts and transactional mail.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    fn load() -> Result<Option<Self>, ConfigError> {
        let Ok(smtp_host) = env::var("SMTP_HOST") else {
            return Ok(None);
        };
        Ok(Some(Self {
            smtp_host,
            smtp_port: parse_var("SMTP_PORT", DEFAULT_SMTP_PORT)?,
            from_address: env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: env::var("SMTP_USER").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
        }))
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { name, value: raw }),
        Err(_) => Ok(default),
    }
}

fn parse_positive<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default + ToString,
{
    let value = parse_var(name, default)?;
    if value <= T::default() {
        return Err(ConfigError::InvalidNumber {
            name,
            value: value.to_string(),
        });
    }
    Ok(value)
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { name: &'static str, value: String },
    MissingJwtSecret,
    IncompleteAdmin,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name, value } => {
                write!(f, "{name} must be a positive number, got '{value}'")
            }
            ConfigError::MissingJwtSecret => {
                write!(f, "APP_JWT_SECRET is required in production")
            }
            ConfigError::IncompleteAdmin => write!(
                f,
                "APP_ADMIN_EMAIL and APP_ADMIN_PASSWORD must be set together"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
