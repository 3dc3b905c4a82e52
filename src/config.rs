use std::time::Duration;

use tracing::warn;

use crate::poll::PollPolicy;

pub const API_KEY_VAR: &str = "IMAGINE_API_KEY";
pub const BASE_URL_VAR: &str = "IMAGINE_API_BASE_URL";
pub const DEFAULT_STYLE_VAR: &str = "DEFAULT_STYLE";
pub const POLL_MAX_ATTEMPTS_VAR: &str = "POLL_MAX_ATTEMPTS";
pub const POLL_INTERVAL_MS_VAR: &str = "POLL_INTERVAL_MS";

pub const BASE_URL_DEFAULT: &str = "https://api.vyro.ai";
pub const STYLE_DEFAULT: &str = "kling-1.0-pro";
pub const POLL_MAX_ATTEMPTS_DEFAULT: u32 = 30;
pub const POLL_INTERVAL_DEFAULT: Duration = Duration::from_millis(2000);

/// Settings for one Lambda container, read once at cold start.
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` is not fatal at startup; each POST answers with a configuration error.
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_style: String,
    pub poll: PollPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: BASE_URL_DEFAULT.into(),
            default_style: STYLE_DEFAULT.into(),
            poll: PollPolicy::new(POLL_MAX_ATTEMPTS_DEFAULT, POLL_INTERVAL_DEFAULT),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR).filter(|key| !key.trim().is_empty());
        let base_url = lookup(BASE_URL_VAR)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(BASE_URL_DEFAULT.into());
        let default_style = lookup(DEFAULT_STYLE_VAR).unwrap_or(STYLE_DEFAULT.into());

        let max_attempts = parse_or(&lookup, POLL_MAX_ATTEMPTS_VAR, POLL_MAX_ATTEMPTS_DEFAULT);
        let interval_ms = parse_or(
            &lookup,
            POLL_INTERVAL_MS_VAR,
            POLL_INTERVAL_DEFAULT.as_millis() as u64,
        );

        Self {
            api_key,
            base_url,
            default_style,
            poll: PollPolicy::new(max_attempts, Duration::from_millis(interval_ms)),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {} value {:?}, using {}", key, raw, default);
            default
        }),
        None => default,
    }
}
