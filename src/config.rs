//! Global configuration parsing and validation.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::{AppError, Result};

fn default_tasks_api_url() -> String {
    "http://localhost:3000".into()
}

fn default_http_port() -> u16 {
    3001
}

fn default_bind_address() -> String {
    "127.0.0.1".into()
}

fn default_server_name() -> String {
    "task-relay".into()
}

/// Global configuration parsed from `config.toml`. Every field has a
/// default, so an empty file (or no file at all) yields a working setup.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Base URL of the external task API.
    #[serde(default = "default_tasks_api_url")]
    pub tasks_api_url: String,
    /// Port the protocol endpoint listens on.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Interface the protocol endpoint binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Server name advertised in the initialize handshake.
    #[serde(default = "default_server_name")]
    pub server_name: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            tasks_api_url: default_tasks_api_url(),
            http_port: default_http_port(),
            bind_address: default_bind_address(),
            server_name: default_server_name(),
        }
    }
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and normalize fields.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&mut self) -> Result<()> {
        if self.tasks_api_url.is_empty() {
            return Err(AppError::Config("tasks_api_url must not be empty".into()));
        }
        if !self.tasks_api_url.starts_with("http://") && !self.tasks_api_url.starts_with("https://")
        {
            return Err(AppError::Config(format!(
                "tasks_api_url must be an http(s) URL, got '{}'",
                self.tasks_api_url
            )));
        }
        self.tasks_api_url = self.tasks_api_url.trim_end_matches('/').to_owned();

        if self.bind_address.is_empty() {
            return Err(AppError::Config("bind_address must not be empty".into()));
        }
        if self.server_name.is_empty() {
            return Err(AppError::Config("server_name must not be empty".into()));
        }

        Ok(())
    }
}
