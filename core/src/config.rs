//! Client configuration, loaded from the environment.

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_PER_PAGE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub per_page: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Reads `TASKS_API_URL`, `TASKS_API_TIMEOUT_MS`, and `TASKS_PER_PAGE`,
    /// falling back to the defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup("TASKS_API_URL") {
            let url = url.trim().trim_end_matches('/');
            if url.is_empty() {
                return Err(ConfigError::Empty {
                    var: "TASKS_API_URL",
                });
            }
            config.base_url = url.to_string();
        }
        if let Some(raw) = lookup("TASKS_API_TIMEOUT_MS") {
            config.timeout = Duration::from_millis(positive("TASKS_API_TIMEOUT_MS", &raw)?);
        }
        if let Some(raw) = lookup("TASKS_PER_PAGE") {
            let per_page = positive("TASKS_PER_PAGE", &raw)?;
            config.per_page = u32::try_from(per_page).map_err(|_| ConfigError::InvalidNumber {
                var: "TASKS_PER_PAGE",
                value: raw.clone(),
            })?;
        }
        Ok(config)
    }
}

fn positive(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            var,
            value: raw.to_string(),
        }),
    }
}
