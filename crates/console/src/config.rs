use std::str::FromStr;
use std::time::Duration;

/// Console configuration loaded from environment variables.
///
/// All fields have defaults matching the reference cadences of the
/// control panel. Override via environment variables (or a `.env` file).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Base URL of the execution service (default: `http://localhost:5001/api`).
    pub api_url: String,
    /// Interval between task-list polls (default: 2s).
    pub task_poll_interval: Duration,
    /// Delay between detail fetches while a task is active (default: 1s).
    pub detail_poll_delay: Duration,
    /// Interval between schedule-list polls (default: 30s).
    pub schedule_poll_interval: Duration,
    /// How long a notification stays visible (default: 3s).
    pub notification_ttl: Duration,
    /// Per-request HTTP timeout (default: 30s).
    pub request_timeout: Duration,
}

/// A configuration variable was present but could not be parsed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{var} must be {expected}, got '{value}'")]
pub struct ConfigError {
    pub var: &'static str,
    pub expected: &'static str,
    pub value: String,
}

pub const DEFAULT_API_URL: &str = "http://localhost:5001/api";

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            task_poll_interval: Duration::from_millis(2000),
            detail_poll_delay: Duration::from_millis(1000),
            schedule_poll_interval: Duration::from_secs(30),
            notification_ttl: Duration::from_millis(3000),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from the process environment with defaults.
    ///
    /// | Env Var                       | Default                     |
    /// |-------------------------------|-----------------------------|
    /// | `EXECUTION_API_URL`           | `http://localhost:5001/api` |
    /// | `TASK_POLL_INTERVAL_MS`       | `2000`                      |
    /// | `DETAIL_POLL_DELAY_MS`        | `1000`                      |
    /// | `SCHEDULE_POLL_INTERVAL_SECS` | `30`                        |
    /// | `NOTIFICATION_TTL_MS`         | `3000`                      |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = lookup("EXECUTION_API_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_url);

        Ok(Self {
            api_url,
            task_poll_interval: millis(&lookup, "TASK_POLL_INTERVAL_MS")?
                .unwrap_or(defaults.task_poll_interval),
            detail_poll_delay: millis(&lookup, "DETAIL_POLL_DELAY_MS")?
                .unwrap_or(defaults.detail_poll_delay),
            schedule_poll_interval: secs(&lookup, "SCHEDULE_POLL_INTERVAL_SECS")?
                .unwrap_or(defaults.schedule_poll_interval),
            notification_ttl: millis(&lookup, "NOTIFICATION_TTL_MS")?
                .unwrap_or(defaults.notification_ttl),
            request_timeout: secs(&lookup, "REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout),
        })
    }
}

fn millis<F>(lookup: &F, var: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(positive::<F>(lookup, var)?.map(Duration::from_millis))
}

fn secs<F>(lookup: &F, var: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(positive::<F>(lookup, var)?.map(Duration::from_secs))
}

/// Zero would turn a poll loop into a busy loop, so it is rejected.
fn positive<F>(lookup: &F, var: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    match u64::from_str(raw.trim()) {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(ConfigError {
            var,
            expected: "a positive integer",
            value: raw,
        }),
    }
}
