use std::env;
use std::fmt;
use std::time::Duration;

use crate::form::ValidationMode;

/// Delay used by the simulated submission when nothing else is configured.
pub const DEFAULT_SUBMIT_DELAY_MS: u64 = 3_000;

/// Distinguishes runtime behavior for different stages of the application.
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
    pub form: FormConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let submit_delay_ms = match env::var("APP_SUBMIT_DELAY_MS") {
            Ok(raw) => parse_delay_ms(&raw)?,
            Err(_) => DEFAULT_SUBMIT_DELAY_MS,
        };

        let validation_mode = match env::var("APP_VALIDATION_MODE") {
            Ok(raw) => raw
                .parse::<ValidationMode>()
                .map_err(|_| ConfigError::InvalidValidationMode { value: raw })?,
            Err(_) => ValidationMode::default(),
        };

        let allow_overlapping_submits = match env::var("APP_ALLOW_OVERLAPPING_SUBMITS") {
            Ok(raw) => parse_flag("APP_ALLOW_OVERLAPPING_SUBMITS", &raw)?,
            Err(_) => false,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            form: FormConfig {
                validation_mode,
                submit_delay: Duration::from_millis(submit_delay_ms),
                allow_overlapping_submits,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Behavior of the form component and its submission handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormConfig {
    pub validation_mode: ValidationMode,
    pub submit_delay: Duration,
    /// When set, a submit is accepted even while an earlier one is still pending.
    pub allow_overlapping_submits: bool,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            validation_mode: ValidationMode::default(),
            submit_delay: Duration::from_millis(DEFAULT_SUBMIT_DELAY_MS),
            allow_overlapping_submits: false,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

fn parse_delay_ms(raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidSubmitDelay {
            value: raw.to_string(),
        })
}

fn parse_flag(variable: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            variable,
            value: raw.to_string(),
        }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidSubmitDelay {
        value: String,
    },
    InvalidValidationMode {
        value: String,
    },
    InvalidFlag {
        variable: &'static str,
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSubmitDelay { value } => write!(
                f,
                "APP_SUBMIT_DELAY_MS must be a whole number of milliseconds, got '{value}'"
            ),
            ConfigError::InvalidValidationMode { value } => write!(
                f,
                "APP_VALIDATION_MODE must be one of on_submit, on_blur, on_change, got '{value}'"
            ),
            ConfigError::InvalidFlag { variable, value } => {
                write!(f, "{variable} must be true or false, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
