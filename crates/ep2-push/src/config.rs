//! Configuration management

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

pub const DEFAULT_SERVER_PUBLIC_KEY: &str =
    "5bf52cba5e433cfe488db5985d30e83c20755dc624f6d4797245bb8f5b04e302";

/// Largest serialized payload the relay accepts, exclusive.
pub const DEFAULT_PUSH_MAX_BYTES: usize = 4078;

/// Where the push relay lives and what it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushConfig {
    /// `https` when true, `http` otherwise.
    pub secure: bool,
    pub host: String,
    pub port: u16,
    /// Context path of the service, starting with `/`.
    pub path: String,
    /// Id of the relay's identity key.
    pub server_public_key: String,
    pub push_max_bytes: usize,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            secure: false,
            host: "localhost".to_string(),
            port: 9001,
            path: "/ep2push".to_string(),
            server_public_key: DEFAULT_SERVER_PUBLIC_KEY.to_string(),
            push_max_bytes: DEFAULT_PUSH_MAX_BYTES,
        }
    }
}

impl PushConfig {
    /// Load configuration from environment variables and TOML file
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|name| std::env::var(name).ok())
    }

    /// Same as [`PushConfig::load`] with a custom variable lookup.
    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("EP2_PUSH_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("EP2_PUSH_PORT") {
            config.port = port
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("Invalid port: {}", e)))?;
        }
        if let Some(path) = lookup("EP2_PUSH_PATH") {
            config.path = path;
        }
        if let Some(secure) = lookup("EP2_PUSH_SECURE") {
            config.secure = parse_bool(&secure)?;
        }
        if let Some(key) = lookup("EP2_PUSH_SERVER_KEY") {
            config.server_public_key = key;
        }
        if let Some(max) = lookup("EP2_PUSH_MAX_BYTES") {
            config.push_max_bytes = max
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("Invalid push_max_bytes: {}", e)))?;
        }

        if let Some(config_path) = lookup("EP2_PUSH_CONFIG") {
            config.load_from_toml(&config_path)?;
        }

        config.validate()?;
        debug!(endpoint = %config.endpoint_url(), "push config loaded");
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must be > 0".to_string()));
        }
        if !self.path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "path must start with '/': {:?}",
                self.path
            )));
        }
        if self.host.is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".to_string()));
        }
        ep2_key::id_to_public_key(&self.server_public_key)
            .map_err(|e| ConfigError::Invalid(format!("Invalid server_public_key: {}", e)))?;
        if self.push_max_bytes == 0 {
            return Err(ConfigError::Invalid("push_max_bytes must be > 0".to_string()));
        }
        Ok(())
    }

    /// Service endpoint, e.g. `http://localhost:9001/ep2push`.
    pub fn endpoint_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}:{}{}", scheme, self.host, self.port, self.path)
    }

    /// Load from TOML config file
    fn load_from_toml(&mut self, path: &str) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let toml_config: toml::Value = toml::from_str(&content)?;

        if let Some(secure) = toml_config.get("secure").and_then(|v| v.as_bool()) {
            self.secure = secure;
        }
        if let Some(host) = toml_config.get("host").and_then(|v| v.as_str()) {
            self.host = host.to_string();
        }
        if let Some(port) = toml_config.get("port").and_then(|v| v.as_integer()) {
            self.port = u16::try_from(port)
                .map_err(|_| ConfigError::Invalid(format!("Invalid port in TOML: {}", port)))?;
        }
        if let Some(path) = toml_config.get("path").and_then(|v| v.as_str()) {
            self.path = path.to_string();
        }
        if let Some(key) = toml_config.get("server_public_key").and_then(|v| v.as_str()) {
            self.server_public_key = key.to_string();
        }
        if let Some(max) = toml_config.get("push_max_bytes").and_then(|v| v.as_integer()) {
            self.push_max_bytes = usize::try_from(max).map_err(|_| {
                ConfigError::Invalid(format!("Invalid push_max_bytes in TOML: {}", max))
            })?;
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid(format!("Invalid boolean: {}", other))),
    }
}
