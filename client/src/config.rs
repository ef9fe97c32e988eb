use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{ChatClientError, Result};

/// Endpoint of the chat backend's WebSocket surface.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EndpointConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
    /// Upgrades the scheme to `wss://` when the hosting context is secure.
    pub secure: bool,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            path: "/chat".to_string(),
            secure: false,
        }
    }
}

impl EndpointConfig {
    /// Builds the channel URL from the configured host, port and scheme.
    pub fn ws_url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!("{}://{}:{}{}", scheme, self.host, self.port, self.path)
    }
}

/// Automatic reconnection policy for the live channel.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReconnectConfig {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay_ms: 3000,
        }
    }
}

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    pub endpoint: EndpointConfig,
    pub reconnect: ReconnectConfig,
}

impl ClientConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ChatClientError::Config(format!("Failed to read config file: {}", e)))?;

        let config: ClientConfig = toml::from_str(&content)
            .map_err(|e| ChatClientError::Config(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_config() {
        let toml_content = r#"
[endpoint]
host = "chat.example.com"
port = 9090
path = "/ws"
secure = true

[reconnect]
max_attempts = 3
delay_ms = 500
        "#;

        let config: ClientConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.endpoint.host, "chat.example.com");
        assert_eq!(config.endpoint.port, 9090);
        assert_eq!(config.reconnect.max_attempts, 3);
        assert_eq!(config.reconnect.delay_ms, 500);
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let toml_content = r#"
[endpoint]
host = "chat.example.com"
        "#;

        let config: ClientConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.endpoint.host, "chat.example.com");
        assert_eq!(config.endpoint.port, 8080);
        assert_eq!(config.endpoint.path, "/chat");
        assert_eq!(config.reconnect, ReconnectConfig::default());
    }

    #[test]
    fn test_ws_url_plain() {
        let endpoint = EndpointConfig::default();
        assert_eq!(endpoint.ws_url(), "ws://127.0.0.1:8080/chat");
    }

    #[test]
    fn test_ws_url_secure() {
        let endpoint = EndpointConfig {
            host: "chat.example.com".to_string(),
            secure: true,
            ..Default::default()
        };
        assert_eq!(endpoint.ws_url(), "wss://chat.example.com:8080/chat");
    }
}
