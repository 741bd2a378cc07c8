use std::str::FromStr;
use std::time::Duration;

use crate::error::ScoutError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram_bot_token: String,
    /// Destination chat for scheduled cycles. `None` disables the scheduler
    /// but manual `/update` still works from any chat.
    pub chat_id: Option<i64>,

    pub poll_interval: Duration,
    pub first_run_delay: Duration,

    pub settings_path: String,
    pub seen_path: String,
    /// Maximum number of listing tokens remembered as already delivered.
    pub seen_cap: usize,

    /// How many of the newest search results are considered per cycle.
    pub window_size: usize,
    /// Pause between consecutive photo lookups.
    pub enrich_delay: Duration,
    pub request_timeout: Duration,

    pub divar_city: String,
    pub divar_category: String,

    /// Port for the liveness endpoint.
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ScoutError> {
        let telegram_bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ScoutError::Config("TELEGRAM_BOT_TOKEN missing".to_string()))?;

        let chat_id = match std::env::var("CHAT_ID") {
            Ok(raw) if !raw.trim().is_empty() => Some(parse_value("CHAT_ID", &raw)?),
            _ => None,
        };

        Ok(Self {
            telegram_bot_token,
            chat_id,
            poll_interval: Duration::from_secs(env_or("POLL_INTERVAL_SECS", 3600)?),
            first_run_delay: Duration::from_secs(env_or("FIRST_RUN_DELAY_SECS", 10)?),
            settings_path: std::env::var("SETTINGS_FILE")
                .unwrap_or_else(|_| "bot_settings.json".to_string()),
            seen_path: std::env::var("SEEN_FILE").unwrap_or_else(|_| "seen_ads.json".to_string()),
            seen_cap: env_or("SEEN_CAP", 1000)?,
            window_size: env_or("WINDOW_SIZE", 5)?,
            enrich_delay: Duration::from_millis(env_or("ENRICH_DELAY_MS", 1500)?),
            request_timeout: Duration::from_secs(env_or("REQUEST_TIMEOUT_SECS", 15)?),
            divar_city: std::env::var("DIVAR_CITY").unwrap_or_else(|_| "karaj".to_string()),
            divar_category: std::env::var("DIVAR_CATEGORY")
                .unwrap_or_else(|_| "buy-apartment".to_string()),
            port: env_or("PORT", 10000)?,
        })
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, ScoutError> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => parse_value(key, &raw),
        _ => Ok(default),
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, ScoutError> {
    raw.trim()
        .parse()
        .map_err(|_| ScoutError::Config(format!("{key} has invalid value '{raw}'")))
}
