//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Directory holding the persisted ledger slices
    pub data_dir: PathBuf,
    /// How long onboarding tooltips stay up before dismissing themselves
    pub tooltip_dismiss_delay: Duration,
    /// Front-end origin allowed by CORS
    pub frontend_url: String,
}

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_TOOLTIP_DISMISS_SECS: u64 = 5;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:8081";

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: parse_var("PORT", DEFAULT_PORT)?,
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR)),
            tooltip_dismiss_delay: Duration::from_secs(parse_var(
                "TOOLTIP_DISMISS_SECS",
                DEFAULT_TOOLTIP_DISMISS_SECS,
            )?),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string()),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: env::temp_dir().join("carbon-tracker-test"),
            tooltip_dismiss_delay: Duration::from_secs(DEFAULT_TOOLTIP_DISMISS_SECS),
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
        }
    }
}

/// Read `name`, falling back to `default` when unset. A set but unparsable
/// value is an error rather than silently ignored.
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
