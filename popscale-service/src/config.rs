//! Service configuration.
//!
//! Loaded once at startup from an optional `config.{toml,yaml,json}` file and
//! `POPSCALE__*` environment variables (e.g. `POPSCALE__SCALING__DIVISOR=5`).

mod defaults;
mod loader;

use serde::Deserialize;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

use crate::coordinator::ChangeKey;
use crate::error::{ServiceError, ServiceResult};
use crate::players::UnreadablePolicy;
use crate::scaling::ScalingSchema;

pub use loader::load_service_config;

use defaults::{
    default_divisor, default_document_path, default_host, default_notify_capacity,
    default_player_file, default_poll_interval_secs, default_port, default_server_enabled,
    default_tag, default_threshold,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub document: DocumentConfig,

    #[serde(default)]
    pub players: PlayersConfig,

    #[serde(default)]
    pub scaling: ScalingConfig,

    #[serde(default)]
    pub notify: NotifyConfig,
}

/// Status API binding
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_enabled")]
    pub enabled: bool,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: default_server_enabled(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// The game mode configuration document
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentConfig {
    #[serde(default = "default_document_path")]
    pub path: PathBuf,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            path: default_document_path(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerSourceKind {
    /// Count pushed via the API or by an embedding host
    #[default]
    Live,
    /// Count read from the player list file
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayersConfig {
    #[serde(default)]
    pub source: PlayerSourceKind,

    /// Player list written by the game server (file source only)
    #[serde(default = "default_player_file")]
    pub file_path: PathBuf,

    /// Report an unusable player list as zero players or as unavailable
    #[serde(default)]
    pub on_unreadable: UnreadablePolicy,
}

impl Default for PlayersConfig {
    fn default() -> Self {
        Self {
            source: PlayerSourceKind::default(),
            file_path: default_player_file(),
            on_unreadable: UnreadablePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScalingConfig {
    /// Population at or above which scaling is suspended
    #[serde(default = "default_threshold")]
    pub threshold: u32,

    /// Players per intensity level
    #[serde(default = "default_divisor")]
    pub divisor: NonZeroU32,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Whether a new level or any new player count triggers a rewrite
    #[serde(default)]
    pub change_key: ChangeKey,

    #[serde(default)]
    pub schema: ScalingSchema,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            divisor: default_divisor(),
            poll_interval_secs: default_poll_interval_secs(),
            change_key: ChangeKey::default(),
            schema: ScalingSchema::default(),
        }
    }
}

impl ScalingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    /// Leading label of update announcements
    #[serde(default = "default_tag")]
    pub tag: String,

    /// Buffered messages per subscriber
    #[serde(default = "default_notify_capacity")]
    pub capacity: usize,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            tag: default_tag(),
            capacity: default_notify_capacity(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> ServiceResult<()> {
        if self.scaling.threshold == 0 {
            return Err(config_error("scaling.threshold must be at least 1"));
        }
        if self.scaling.poll_interval_secs == 0 {
            return Err(config_error("scaling.poll_interval_secs must be at least 1"));
        }
        if self.notify.capacity == 0 {
            return Err(config_error("notify.capacity must be at least 1"));
        }
        if self.server.enabled && self.server.host.trim().is_empty() {
            return Err(config_error("server.host must not be empty"));
        }
        self.scaling.schema.validate()
    }
}

fn config_error(message: &str) -> ServiceError {
    ServiceError::Config {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.scaling.threshold, 50);
        assert_eq!(config.scaling.divisor.get(), 10);
        assert_eq!(config.scaling.poll_interval(), Duration::from_secs(90));
        assert_eq!(config.scaling.change_key, ChangeKey::Level);
        assert_eq!(config.players.source, PlayerSourceKind::Live);
        assert_eq!(config.players.on_unreadable, UnreadablePolicy::Empty);
        config.validate().unwrap();
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let mut config = ServiceConfig::default();
        config.scaling.poll_interval_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ServiceError::Config { .. })
        ));
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let mut config = ServiceConfig::default();
        config.scaling.threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_host_rejected_only_when_server_enabled() {
        let mut config = ServiceConfig::default();
        config.server.host = " ".to_string();
        assert!(config.validate().is_err());

        config.server.enabled = false;
        config.validate().unwrap();
    }

    #[test]
    fn test_invalid_schema_rejected() {
        let mut config = ServiceConfig::default();
        config.scaling.schema.rewards_path = String::new();
        assert!(matches!(
            config.validate(),
            Err(ServiceError::InvalidSchema { .. })
        ));
    }
}
