use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_INSTITUTIONAL_DOMAINS: &[&str] = &[
    ".edu", ".edu.in", ".ac.uk", ".ac.fr", ".edu.au", ".ac.nz", ".edu.sg", ".ac.in",
];

const DEFAULT_INSTITUTIONAL_PATTERNS: &[&str] = &[
    r"\.edu$",
    r"\.edu\.[a-z]{2}$",
    r"\.ac\.[a-z]{2}$",
    r"\.university$",
];

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
    pub mail: MailConfig,
    pub safety: SafetyConfig,
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
        let log_format = match env::var("APP_LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw).ok_or(ConfigError::InvalidLogFormat(raw))?,
            Err(_) => LogFormat::Compact,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            auth: AuthConfig::from_env(),
            mail: MailConfig::from_env()?,
            safety: SafetyConfig::from_env()?,
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

/// Output shape for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

/// Institutional email policy injected into the sign-in gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Domain suffixes accepted verbatim, e.g. `.ac.uk`.
    pub institutional_domains: Vec<String>,
    /// Regular expressions matched against the lowercased email domain.
    pub institutional_patterns: Vec<String>,
    /// Where non-institutional sign-ins are sent instead of creating an account.
    pub manual_verification_path: String,
}

impl AuthConfig {
    fn from_env() -> Self {
        let institutional_domains = env::var("AUTH_INSTITUTIONAL_DOMAINS")
            .map(|raw| split_list(&raw, ','))
            .unwrap_or_else(|_| to_owned_list(DEFAULT_INSTITUTIONAL_DOMAINS));
        // Patterns may contain commas (`{2,3}`), so they are whitespace separated.
        let institutional_patterns = env::var("AUTH_INSTITUTIONAL_PATTERNS")
            .map(|raw| raw.split_whitespace().map(str::to_string).collect())
            .unwrap_or_else(|_| to_owned_list(DEFAULT_INSTITUTIONAL_PATTERNS));
        let manual_verification_path = env::var("AUTH_MANUAL_VERIFICATION_PATH")
            .unwrap_or_else(|_| "/student/manual-verification".to_string());

        Self {
            institutional_domains,
            institutional_patterns,
            manual_verification_path,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            institutional_domains: to_owned_list(DEFAULT_INSTITUTIONAL_DOMAINS),
            institutional_patterns: to_owned_list(DEFAULT_INSTITUTIONAL_PATTERNS),
            manual_verification_path: "/student/manual-verification".to_string(),
        }
    }
}

/// SMTP settings for the notification gateway.
#[derive(Clone)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub admin_recipient: String,
    /// Upper bound on one SMTP conversation, connect included.
    pub timeout_secs: u64,
}

impl MailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("EMAIL_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());
        let port = env::var("EMAIL_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidMailPort)?;
        let timeout_secs = env::var("EMAIL_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|value| *value > 0)
            .ok_or(ConfigError::InvalidMailTimeout)?;

        Ok(Self {
            host,
            port,
            username: non_empty_var("EMAIL_USER"),
            password: non_empty_var("EMAIL_PASS"),
            from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "\"WanderNest\" <noreply@wandernest.com>".to_string()),
            admin_recipient: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "safety@wandernest.com".to_string()),
            timeout_secs,
        })
    }

    /// SMTP delivery is only attempted when credentials are present.
    pub fn smtp_enabled(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("from", &self.from)
            .field("admin_recipient", &self.admin_recipient)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Knobs for the report escalation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyConfig {
    pub pattern_threshold: u32,
    pub pattern_window_days: i64,
}

impl SafetyConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let pattern_threshold = match env::var("SAFETY_PATTERN_THRESHOLD") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or(ConfigError::InvalidPatternThreshold)?,
            Err(_) => defaults.pattern_threshold,
        };

        let pattern_window_days = match env::var("SAFETY_PATTERN_WINDOW_DAYS") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or(ConfigError::InvalidPatternWindow)?,
            Err(_) => defaults.pattern_window_days,
        };

        Ok(Self {
            pattern_threshold,
            pattern_window_days,
        })
    }
}

impl Default for SafetyConfig {
    /// Three reports within six 30-day months.
    fn default() -> Self {
        Self {
            pattern_threshold: 3,
            pattern_window_days: 6 * 30,
        }
    }
}

fn split_list(raw: &str, separator: char) -> Vec<String> {
    raw.split(separator)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat(String),
    InvalidMailPort,
    InvalidMailTimeout,
    InvalidPatternThreshold,
    InvalidPatternWindow,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'json' (found '{value}')")
            }
            ConfigError::InvalidMailPort => write!(f, "EMAIL_PORT must be a valid u16"),
            ConfigError::InvalidMailTimeout => {
                write!(f, "EMAIL_TIMEOUT_SECS must be a positive number of seconds")
            }
            ConfigError::InvalidPatternThreshold => {
                write!(f, "SAFETY_PATTERN_THRESHOLD must be a positive integer")
            }
            ConfigError::InvalidPatternWindow => {
                write!(f, "SAFETY_PATTERN_WINDOW_DAYS must be a positive number of days")
            }
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
