use std::str::FromStr;
use std::time::Duration;

use huddle_dialogue::{LifecycleConfig, SchedulerConfig};
use huddle_llm::GeminiConfig;

/// Where sessions are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres { database_url: String },
    /// Process-local maps. Everything is lost on restart.
    Memory,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for watchdog loops (default: `30`).
    pub shutdown_timeout_secs: u64,
    pub storage: StorageBackend,
    pub lifecycle: LifecycleConfig,
    pub scheduler: SchedulerConfig,
    pub gemini: GeminiConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `HOST`                   | `0.0.0.0`                  |
    /// | `PORT`                   | `3000`                     |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`  | `30`                       |
    /// | `PUBLIC_BASE_URL`        | `http://localhost:3000`    |
    /// | `STORAGE_BACKEND`        | `postgres`                 |
    /// | `DATABASE_URL`           | required for `postgres`    |
    /// | `GEMINI_API_KEY`         | empty                      |
    /// | `GEMINI_REPLY_MODEL`     | `gemini-2.5-flash`         |
    /// | `GEMINI_FEEDBACK_MODEL`  | `gemini-2.5-pro`           |
    /// | `GEMINI_TIMEOUT_SECS`    | `30`                       |
    /// | `REPLY_DELAY_MIN_MS`     | `1000`                     |
    /// | `REPLY_DELAY_MAX_MS`     | `4000`                     |
    /// | `WATCHDOG_INTERVAL_SECS` | `20`                       |
    /// | `IDLE_THRESHOLD_SECS`    | `15`                       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&lookup);

        let storage = match vars.string("STORAGE_BACKEND", "postgres").as_str() {
            "postgres" => StorageBackend::Postgres {
                database_url: vars
                    .optional("DATABASE_URL")
                    .ok_or(ConfigError::Missing("DATABASE_URL"))?,
            },
            "memory" => StorageBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE_BACKEND",
                    expected: "backend (postgres or memory)",
                    value: other.to_string(),
                })
            }
        };

        let scheduler_defaults = SchedulerConfig::default();
        let scheduler = SchedulerConfig {
            reply_delay_min: Duration::from_millis(vars.parsed(
                "REPLY_DELAY_MIN_MS",
                "u64",
                millis(scheduler_defaults.reply_delay_min),
            )?),
            reply_delay_max: Duration::from_millis(vars.parsed(
                "REPLY_DELAY_MAX_MS",
                "u64",
                millis(scheduler_defaults.reply_delay_max),
            )?),
            watchdog_interval: Duration::from_secs(vars.parsed(
                "WATCHDOG_INTERVAL_SECS",
                "u64",
                scheduler_defaults.watchdog_interval.as_secs(),
            )?),
            idle_threshold: Duration::from_secs(vars.parsed(
                "IDLE_THRESHOLD_SECS",
                "u64",
                scheduler_defaults.idle_threshold.as_secs(),
            )?),
            ..scheduler_defaults
        };
        if scheduler.watchdog_interval.is_zero() {
            return Err(ConfigError::Invalid {
                name: "WATCHDOG_INTERVAL_SECS",
                expected: "non-zero number of seconds",
                value: "0".to_string(),
            });
        }
        if scheduler.reply_delay_min > scheduler.reply_delay_max {
            return Err(ConfigError::Invalid {
                name: "REPLY_DELAY_MIN_MS",
                expected: "value not above REPLY_DELAY_MAX_MS",
                value: millis(scheduler.reply_delay_min).to_string(),
            });
        }

        let gemini_defaults = GeminiConfig::default();
        let gemini = GeminiConfig {
            api_key: vars.string("GEMINI_API_KEY", ""),
            reply_model: vars.string("GEMINI_REPLY_MODEL", &gemini_defaults.reply_model),
            feedback_model: vars.string("GEMINI_FEEDBACK_MODEL", &gemini_defaults.feedback_model),
            timeout: Duration::from_secs(vars.parsed(
                "GEMINI_TIMEOUT_SECS",
                "u64",
                gemini_defaults.timeout.as_secs(),
            )?),
            ..gemini_defaults
        };

        let lifecycle = LifecycleConfig {
            public_base_url: vars.string(
                "PUBLIC_BASE_URL",
                &LifecycleConfig::default().public_base_url,
            ),
            ..LifecycleConfig::default()
        };

        Ok(Self {
            host: vars.string("HOST", "0.0.0.0"),
            port: vars.parsed("PORT", "u16", 3000)?,
            cors_origins: vars
                .string("CORS_ORIGINS", "http://localhost:5173")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            request_timeout_secs: vars.parsed("REQUEST_TIMEOUT_SECS", "u64", 30)?,
            shutdown_timeout_secs: vars.parsed("SHUTDOWN_TIMEOUT_SECS", "u64", 30)?,
            storage,
            lifecycle,
            scheduler,
            gemini,
        })
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

struct Vars<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    /// The trimmed value, with empty treated as unset.
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn string(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T: FromStr>(
        &self,
        name: &'static str,
        expected: &'static str,
        default: T,
    ) -> Result<T, ConfigError> {
        match self.optional(name) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name,
                expected,
                value,
            }),
        }
    }
}
