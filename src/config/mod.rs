//! Configuration management for mixer-sync
//!
//! Handles loading, parsing, and hot-reloading of YAML configuration files.

pub mod watcher;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::fs;

use crate::mixer::MixerSettings;
use crate::profile::{self, DeviceProfile, MixerType};

pub use watcher::ConfigWatcher;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub mixer: MixerConfig,
    /// Full custom profile, replacing the built-in one for `mixer.type`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<DeviceProfile>,
}

/// Console connection and timing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MixerConfig {
    #[serde(rename = "type", default = "default_mixer_type")]
    pub mixer_type: MixerType,
    #[serde(default)]
    pub ip: String,
    /// Overrides the profile's port
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,
    #[serde(default = "default_scene_settle_ms")]
    pub scene_settle_ms: u64,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path))?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        if self.mixer.keepalive_secs == 0 || self.mixer.keepalive_secs >= 10 {
            anyhow::bail!(
                "mixer.keepalive_secs must be between 1 and 9 (got {}), subscriptions expire after 10 s",
                self.mixer.keepalive_secs
            );
        }

        if let Some(profile) = &self.profile {
            if profile.addresses.is_empty() {
                anyhow::bail!("Profile '{}' must define at least one address", profile.name);
            }
            if profile.scene_load_command.is_empty() {
                anyhow::bail!("Profile '{}' scene_load_command cannot be empty", profile.name);
            }
            for entry in &profile.addresses {
                if !entry.address.starts_with('/') {
                    anyhow::bail!("Profile address '{}' must start with '/'", entry.address);
                }
            }
        }

        Ok(())
    }

    /// Profile in effect: the custom one if given, else the built-in one
    pub fn device_profile(&self) -> DeviceProfile {
        self.profile
            .clone()
            .unwrap_or_else(|| profile::for_type(self.mixer.mixer_type))
    }

    /// Client settings; the port falls back to the profile's
    pub fn to_settings(&self) -> MixerSettings {
        let port = self.mixer.port.unwrap_or_else(|| self.device_profile().port);
        let mut settings = MixerSettings::new(self.mixer.ip.clone(), port);
        settings.delay = Duration::from_millis(self.mixer.delay_ms);
        settings.connect_timeout = Duration::from_millis(self.mixer.connect_timeout_ms);
        settings.query_timeout = Duration::from_millis(self.mixer.query_timeout_ms);
        settings.keepalive = Duration::from_secs(self.mixer.keepalive_secs);
        settings.scene_settle = Duration::from_millis(self.mixer.scene_settle_ms);
        settings
    }
}

// Default value functions
fn default_mixer_type() -> MixerType { MixerType::X32 }
fn default_delay_ms() -> u64 { 20 }
fn default_connect_timeout_ms() -> u64 { 500 }
fn default_query_timeout_ms() -> u64 { 100 }
fn default_keepalive_secs() -> u64 { 9 }
fn default_scene_settle_ms() -> u64 { 1000 }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AddressEntry;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_minimal_config_applies_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "mixer:\n  type: xr18\n  ip: 192.168.1.60\n")?;

        let config = AppConfig::load(&path.to_string_lossy()).await?;
        assert_eq!(config.mixer.mixer_type, MixerType::Xr18);
        assert!(config.profile.is_none());

        let settings = config.to_settings();
        assert_eq!(settings.ip, "192.168.1.60");
        assert_eq!(settings.port, 10024);
        assert_eq!(settings.delay, Duration::from_millis(20));
        assert_eq!(settings.keepalive, Duration::from_secs(9));
        assert_eq!(config.device_profile().scene_load_command, "/-snap/load");
        Ok(())
    }

    #[tokio::test]
    async fn test_save_and_reload_custom_profile() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.yaml");
        let path = path.to_string_lossy().to_string();

        let mut custom = profile::for_type(MixerType::X32);
        custom.name = "Small X32".to_string();
        custom.addresses = vec![AddressEntry::rewritten("/-show/prepos/current", "/scene/current")];

        let config = AppConfig {
            mixer: MixerConfig {
                mixer_type: MixerType::X32,
                ip: "10.0.0.2".to_string(),
                port: Some(10030),
                delay_ms: 5,
                connect_timeout_ms: 250,
                query_timeout_ms: 50,
                keepalive_secs: 8,
                scene_settle_ms: 500,
            },
            profile: Some(custom.clone()),
        };
        config.save(&path).await?;

        let loaded = AppConfig::load(&path).await?;
        assert_eq!(loaded.device_profile(), custom);
        assert_eq!(loaded.to_settings().port, 10030);
        assert_eq!(loaded.to_settings().scene_settle, Duration::from_millis(500));
        Ok(())
    }

    #[tokio::test]
    async fn test_rejects_keepalive_past_expiry() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "mixer:\n  ip: 192.168.1.60\n  keepalive_secs: 10\n")?;

        assert!(AppConfig::load(&path.to_string_lossy()).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let err = AppConfig::load("/nonexistent/mixer-sync.yaml").await.unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
