//! Console configuration: API endpoints, storage keys, and guard timing.
//!
//! SYSTEM CONTEXT
//! ==============
//! A browser bundle has no process environment, so values are baked in at
//! build time via `option_env!` and parsed through the same lookup path the
//! tests drive directly.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "";
pub const DEFAULT_LOGIN_ENDPOINT: &str = "/api/auth/login";
pub const DEFAULT_REFRESH_ENDPOINT: &str = "/api/auth/refresh";
pub const DEFAULT_SESSION_ENDPOINT: &str = "/api/auth/me";
pub const DEFAULT_LOGOUT_ENDPOINT: &str = "/api/auth/logout";
pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_ACCESS_TOKEN_KEY: &str = "access_token";
pub const DEFAULT_REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const DEFAULT_INITIAL_LOAD_WINDOW_MS: u64 = 150;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a non-negative integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} is not a log level: {value:?}")]
    InvalidLogLevel { key: &'static str, value: String },
    #[error("{key} must start with '/': {value:?}")]
    InvalidPath { key: &'static str, value: String },
}

/// Durable-storage key names for the two halves of a credential pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub access_token: String,
    pub refresh_token: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            access_token: DEFAULT_ACCESS_TOKEN_KEY.to_owned(),
            refresh_token: DEFAULT_REFRESH_TOKEN_KEY.to_owned(),
        }
    }
}

/// Remote auth endpoint paths, relative to `api_base_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEndpoints {
    pub login: String,
    pub refresh: String,
    pub session: String,
    pub logout: String,
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            login: DEFAULT_LOGIN_ENDPOINT.to_owned(),
            refresh: DEFAULT_REFRESH_ENDPOINT.to_owned(),
            session: DEFAULT_SESSION_ENDPOINT.to_owned(),
            logout: DEFAULT_LOGOUT_ENDPOINT.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Prefix joined onto every request path. Empty means same origin.
    pub api_base_url: String,
    pub endpoints: AuthEndpoints,
    pub storage_keys: StorageKeys,
    /// Client route of the login screen.
    pub login_path: String,
    /// How long the route guard waits before treating "no credentials" as logged out.
    pub initial_load_window: Duration,
    pub log_level: log::Level,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            endpoints: AuthEndpoints::default(),
            storage_keys: StorageKeys::default(),
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            initial_load_window: Duration::from_millis(DEFAULT_INITIAL_LOAD_WINDOW_MS),
            log_level: log::Level::Info,
        }
    }
}

impl SessionConfig {
    /// Build config from `key -> value` lookups.
    ///
    /// Recognized keys (all optional):
    /// - `CONSOLE_API_BASE_URL`: default same origin
    /// - `CONSOLE_LOGIN_ENDPOINT`, `CONSOLE_REFRESH_ENDPOINT`,
    ///   `CONSOLE_SESSION_ENDPOINT`, `CONSOLE_LOGOUT_ENDPOINT`
    /// - `CONSOLE_LOGIN_PATH`: default `/login`
    /// - `CONSOLE_ACCESS_TOKEN_KEY`, `CONSOLE_REFRESH_TOKEN_KEY`
    /// - `CONSOLE_INITIAL_LOAD_WINDOW_MS`: default 150
    /// - `CONSOLE_LOG_LEVEL`: `error` | `warn` | `info` (default) | `debug` | `trace`
    ///
    /// # Errors
    ///
    /// Returns an error when a present value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_base_url = lookup("CONSOLE_API_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_owned())
            .unwrap_or(defaults.api_base_url);

        let endpoints = AuthEndpoints {
            login: path_or(&lookup, "CONSOLE_LOGIN_ENDPOINT", defaults.endpoints.login)?,
            refresh: path_or(&lookup, "CONSOLE_REFRESH_ENDPOINT", defaults.endpoints.refresh)?,
            session: path_or(&lookup, "CONSOLE_SESSION_ENDPOINT", defaults.endpoints.session)?,
            logout: path_or(&lookup, "CONSOLE_LOGOUT_ENDPOINT", defaults.endpoints.logout)?,
        };

        let storage_keys = StorageKeys {
            access_token: lookup("CONSOLE_ACCESS_TOKEN_KEY").unwrap_or(defaults.storage_keys.access_token),
            refresh_token: lookup("CONSOLE_REFRESH_TOKEN_KEY").unwrap_or(defaults.storage_keys.refresh_token),
        };

        let login_path = path_or(&lookup, "CONSOLE_LOGIN_PATH", defaults.login_path)?;

        let initial_load_window = match lookup("CONSOLE_INITIAL_LOAD_WINDOW_MS") {
            Some(raw) => Duration::from_millis(parse_u64("CONSOLE_INITIAL_LOAD_WINDOW_MS", &raw)?),
            None => defaults.initial_load_window,
        };

        let log_level = match lookup("CONSOLE_LOG_LEVEL") {
            Some(raw) => parse_log_level(&raw)?,
            None => defaults.log_level,
        };

        Ok(Self { api_base_url, endpoints, storage_keys, login_path, initial_load_window, log_level })
    }

    /// Build config from values captured by the compiler when the bundle was built.
    ///
    /// # Errors
    ///
    /// Returns an error when a baked-in value cannot be parsed.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| {
            let value = match key {
                "CONSOLE_API_BASE_URL" => option_env!("CONSOLE_API_BASE_URL"),
                "CONSOLE_LOGIN_ENDPOINT" => option_env!("CONSOLE_LOGIN_ENDPOINT"),
                "CONSOLE_REFRESH_ENDPOINT" => option_env!("CONSOLE_REFRESH_ENDPOINT"),
                "CONSOLE_SESSION_ENDPOINT" => option_env!("CONSOLE_SESSION_ENDPOINT"),
                "CONSOLE_LOGOUT_ENDPOINT" => option_env!("CONSOLE_LOGOUT_ENDPOINT"),
                "CONSOLE_LOGIN_PATH" => option_env!("CONSOLE_LOGIN_PATH"),
                "CONSOLE_ACCESS_TOKEN_KEY" => option_env!("CONSOLE_ACCESS_TOKEN_KEY"),
                "CONSOLE_REFRESH_TOKEN_KEY" => option_env!("CONSOLE_REFRESH_TOKEN_KEY"),
                "CONSOLE_INITIAL_LOAD_WINDOW_MS" => option_env!("CONSOLE_INITIAL_LOAD_WINDOW_MS"),
                "CONSOLE_LOG_LEVEL" => option_env!("CONSOLE_LOG_LEVEL"),
                _ => None,
            };
            value.map(str::to_owned)
        })
    }

    /// Join a request path onto the configured API base.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base_url)
    }
}

fn path_or<F>(lookup: &F, key: &'static str, default: String) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if value.starts_with('/') => Ok(value),
        Some(value) => Err(ConfigError::InvalidPath { key, value }),
        None => Ok(default),
    }
}

fn parse_u64(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidNumber { key, value: raw.to_owned() })
}

fn parse_log_level(raw: &str) -> Result<log::Level, ConfigError> {
    raw.trim()
        .parse::<log::Level>()
        .map_err(|_| ConfigError::InvalidLogLevel { key: "CONSOLE_LOG_LEVEL", value: raw.to_owned() })
}
