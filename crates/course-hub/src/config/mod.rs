use std::env;
use std::fmt;

const DEFAULT_BLOB_BASE_URL: &str = "http://localhost:9000/course-hub";
const DEFAULT_MAIL_SENDER: &str = "no-reply@course-hub.local";
const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

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
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let public_base_url = env::var("APP_BLOB_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BLOB_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let max_image_bytes = match env::var("APP_MAX_IMAGE_BYTES") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|bytes| *bytes > 0)
                .ok_or_else(|| ConfigError::InvalidImageLimit { value: raw.clone() })?,
            Err(_) => DEFAULT_MAX_IMAGE_BYTES,
        };

        let sender = env::var("APP_MAIL_SENDER").unwrap_or_else(|_| DEFAULT_MAIL_SENDER.to_string());
        if !sender.contains('@') {
            return Err(ConfigError::InvalidMailSender { value: sender });
        }

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            storage: StorageConfig {
                public_base_url,
                max_image_bytes,
            },
            mail: MailConfig { sender },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Blob store settings used for post images.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub public_base_url: String,
    pub max_image_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            public_base_url: DEFAULT_BLOB_BASE_URL.to_string(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

/// Outbound e-mail settings.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub sender: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidImageLimit { value: String },
    InvalidMailSender { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidImageLimit { value } => write!(
                f,
                "APP_MAX_IMAGE_BYTES must be a positive integer (found '{}')",
                value
            ),
            ConfigError::InvalidMailSender { value } => {
                write!(f, "APP_MAIL_SENDER must be an e-mail address (found '{}')", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
