// Configuration loading and validation (config/draft.toml).

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::draft::model::{LeagueId, ManagerId};

/// File name of the session configuration inside `config/`.
pub const CONFIG_FILE: &str = "draft.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// draft.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

/// Where the coordination server lives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Host and optional port, e.g. `draft.example.com` or `localhost:8080`.
    pub host: String,
    /// Use `wss`/`https` instead of `ws`/`http`.
    #[serde(default)]
    pub secure: bool,
}

impl ServerConfig {
    /// Base URL for the HTTP collaborators, without a trailing slash.
    pub fn http_base(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{}", self.host)
    }

    /// Base URL for WebSocket connections.
    pub fn ws_base(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!("{scheme}://{}", self.host)
    }
}

/// Which draft room to join, and as whom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    pub league_id: LeagueId,
    pub user_id: ManagerId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// How long to wait for the server to echo a submitted pick.
    pub pick_echo_timeout_secs: u64,
    pub reconnect_initial_backoff_ms: u64,
    pub reconnect_max_backoff_ms: u64,
    pub reconnect_max_attempts: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            pick_echo_timeout_secs: 10,
            reconnect_initial_backoff_ms: 500,
            reconnect_max_backoff_ms: 8_000,
            reconnect_max_attempts: 6,
        }
    }
}

impl TimingConfig {
    pub fn pick_echo_timeout(&self) -> Duration {
        Duration::from_secs(self.pick_echo_timeout_secs)
    }

    /// Delay before reconnect attempt `attempt` (1-based): doubles each
    /// attempt, capped at the maximum.
    pub fn reconnect_backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(31);
        let ms = self
            .reconnect_initial_backoff_ms
            .saturating_mul(1u64 << shift)
            .min(self.reconnect_max_backoff_ms);
        Duration::from_millis(ms)
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/draft.toml` relative to `base_dir`.
///
/// Does not copy defaults; see [`load_config`].
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = std::fs::read_to_string(&path)
        .map_err(|_| ConfigError::FileNotFound { path: path.clone() })?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Copy every file in `defaults/` that is missing from `config/`, skipping
/// `.example` templates. Returns the files written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");
    let copy_err = |message: String| ConfigError::DefaultsCopyError { message };

    if !defaults_dir.exists() {
        if config_dir.exists() {
            return Ok(vec![]);
        }
        return Err(copy_err(format!(
            "neither defaults/ nor config/ directory found in {}",
            base_dir.display()
        )));
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_err(format!("failed to create config directory: {e}")))?;

    let entries = std::fs::read_dir(&defaults_dir)
        .map_err(|e| copy_err(format!("failed to read defaults directory: {e}")))?;

    let mut copied = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| copy_err(format!("failed to read defaults entry: {e}")))?
            .path();
        let Some(file_name) = path.file_name().filter(|_| path.is_file()) else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);
        if target.exists() {
            continue;
        }
        std::fs::copy(&path, &target).map_err(|e| {
            copy_err(format!(
                "failed to copy {} to {}: {e}",
                path.display(),
                target.display()
            ))
        })?;
        copied.push(target);
    }

    Ok(copied)
}

/// Pick the directory holding `config/` and `defaults/`: the working
/// directory when it has either, otherwise the platform config directory.
pub fn resolve_base_dir(cwd: &Path) -> PathBuf {
    if cwd.join("config").exists() || cwd.join("defaults").exists() {
        return cwd.to_path_buf();
    }
    ProjectDirs::from("", "", "snakedraft")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| cwd.to_path_buf())
}

/// Load config for the current working directory, copying defaults first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    let base = resolve_base_dir(&cwd);
    ensure_config_files(&base)?;
    load_config_from(&base)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.server.host.trim().is_empty() {
        return Err(invalid("server.host", "must not be empty"));
    }
    if config.server.host.contains("://") {
        return Err(invalid(
            "server.host",
            "must be a bare host; set `secure` to choose the scheme",
        ));
    }

    if config.session.league_id.0 <= 0 {
        return Err(invalid("session.league_id", "must be greater than 0"));
    }
    if config.session.user_id.0 <= 0 {
        return Err(invalid("session.user_id", "must be greater than 0"));
    }

    let timing = &config.timing;
    if timing.pick_echo_timeout_secs == 0 {
        return Err(invalid("timing.pick_echo_timeout_secs", "must be > 0"));
    }
    if timing.reconnect_max_attempts == 0 {
        return Err(invalid("timing.reconnect_max_attempts", "must be > 0"));
    }
    if timing.reconnect_initial_backoff_ms > timing.reconnect_max_backoff_ms {
        return Err(invalid(
            "timing.reconnect_initial_backoff_ms",
            format!(
                "must not exceed reconnect_max_backoff_ms ({})",
                timing.reconnect_max_backoff_ms
            ),
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
