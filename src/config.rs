use chrono::{FixedOffset, Local, Offset};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Sensor API
    pub api_base_url: String,
    pub request_timeout_seconds: Option<u64>,

    // Refresh settings
    pub update_interval_seconds: u64,
    pub update_marker_millis: u64,
    pub auto_refresh_on_start: bool,
    pub discard_stale_responses: bool,

    // Chart and table settings
    pub default_time_range_hours: u32,
    pub readings_per_hour: u32,
    pub table_row_limit: usize,

    // Display
    pub display_offset: FixedOffset,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5005".to_string(),
            request_timeout_seconds: None,
            update_interval_seconds: 30,
            update_marker_millis: 500,
            auto_refresh_on_start: false,
            discard_stale_responses: false,
            default_time_range_hours: 24,
            readings_per_hour: 60,
            table_row_limit: 10,
            display_offset: Local::now().offset().fix(),
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `DISPLAY_UTC_OFFSET_MINUTES` is set but is not a
    /// valid UTC offset.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let display_offset = match env::var("DISPLAY_UTC_OFFSET_MINUTES") {
            Ok(raw) => parse_offset_minutes(&raw)?,
            Err(_) => defaults.display_offset,
        };

        Ok(Self {
            // Sensor API
            api_base_url: env::var("API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            request_timeout_seconds: env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0),

            // Refresh settings
            update_interval_seconds: env::var("UPDATE_INTERVAL_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            update_marker_millis: env::var("UPDATE_MARKER_MILLIS")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .unwrap_or(500),
            auto_refresh_on_start: env::var("AUTO_REFRESH_ON_START")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            discard_stale_responses: env::var("DISCARD_STALE_RESPONSES")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),

            // Chart and table settings
            default_time_range_hours: env::var("DEFAULT_TIME_RANGE_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .unwrap_or(24),
            readings_per_hour: env::var("READINGS_PER_HOUR")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
            table_row_limit: env::var("TABLE_ROW_LIMIT")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),

            // Display
            display_offset,
            log_format: LogFormat::from_str(
                &env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
            ),
        })
    }

    #[must_use]
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_seconds.max(1))
    }

    #[must_use]
    pub fn update_marker_delay(&self) -> Duration {
        Duration::from_millis(self.update_marker_millis)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_seconds.map(Duration::from_secs)
    }
}

fn parse_offset_minutes(raw: &str) -> Result<FixedOffset, ConfigError> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .and_then(|minutes| minutes.checked_mul(60))
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| ConfigError::Invalid {
            name: "DISPLAY_UTC_OFFSET_MINUTES",
            value: raw.to_string(),
        })
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
