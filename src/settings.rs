use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::hub::BACKEND_STATE_UPDATE;
use crate::view::HostOs;

/// Errors that can occur while resolving the settings location
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Bridge settings, stored next to the client's other config files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub replay: ReplaySettings,
    #[serde(default)]
    pub view: ViewSettings,
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing_subscriber` filter directive, used when RUST_LOG is unset
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "miner_bridge=debug,info".to_string()
}

/// Scripted backend used by `replay` and `set`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaySettings {
    /// Channel the listener subscribes to
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Command names the scripted backend always rejects
    #[serde(default)]
    pub rejected_commands: Vec<String>,
    /// Pause between emitted events, in milliseconds
    #[serde(default)]
    pub event_delay_ms: u64,
    /// How long to wait for the listener to drain once every event is sent
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Fixed responses by command name; unlisted commands answer null
    #[serde(default)]
    pub responses: BTreeMap<String, Value>,
    /// Per-call latency by command name, in milliseconds, consumed in order
    #[serde(default)]
    pub command_delays_ms: BTreeMap<String, Vec<u64>>,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            rejected_commands: Vec::new(),
            event_delay_ms: 0,
            timeout_secs: default_timeout_secs(),
            responses: BTreeMap::new(),
            command_delays_ms: BTreeMap::new(),
        }
    }
}

fn default_channel() -> String {
    BACKEND_STATE_UPDATE.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Sync view settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewSettings {
    /// Platform to render for instead of the host one
    #[serde(default)]
    pub host_os: Option<HostOs>,
}

impl ViewSettings {
    pub fn host_os(&self) -> HostOs {
        self.host_os.unwrap_or_else(HostOs::current)
    }
}

impl AppSettings {
    /// Get the settings file path
    pub fn settings_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("com", "minerbridge", "MinerBridge")
            .ok_or(SettingsError::NoConfigDir)?;

        let config_dir = dirs.config_dir();
        std::fs::create_dir_all(config_dir)?;

        Ok(config_dir.join("settings.toml"))
    }

    /// Load settings from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_path()?)
    }

    /// Load settings from a file, falling back to defaults if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let settings: AppSettings = toml::from_str(&content)?;
            tracing::info!("Loaded settings from {:?}", path);
            Ok(settings)
        } else {
            tracing::info!("No settings file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::info!("Saved settings to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AppSettings::load_from(&dir.path().join("settings.toml")).unwrap();
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.replay.channel, BACKEND_STATE_UPDATE);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            "[replay]\nrejected_commands = [\"set_mode\"]\n\n[view]\nhost_os = \"macos\"\n",
        )
        .unwrap();

        let settings = AppSettings::load_from(&path).unwrap();
        assert_eq!(settings.replay.rejected_commands, vec!["set_mode"]);
        assert_eq!(settings.replay.channel, BACKEND_STATE_UPDATE);
        assert_eq!(settings.view.host_os(), HostOs::Macos);
        assert_eq!(settings.logging.filter, "miner_bridge=debug,info");
    }

    #[test]
    fn test_scripted_responses_and_delays() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            r#"
[replay.responses]
get_transactions = [{ tx_id = "t1", amount = 5, mined_in_block_height = 9, is_coinbase = true }]

[replay.command_delays_ms]
start_cpu_mining = [200, 0]
"#,
        )
        .unwrap();

        let settings = AppSettings::load_from(&path).unwrap();
        assert_eq!(
            settings.replay.responses["get_transactions"][0]["tx_id"],
            "t1"
        );
        assert_eq!(settings.replay.command_delays_ms["start_cpu_mining"], vec![200, 0]);
        assert_eq!(settings.replay.timeout_secs, 30);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let mut settings = AppSettings::default();
        settings.replay.event_delay_ms = 25;

        settings.save_to(&path).unwrap();
        assert_eq!(AppSettings::load_from(&path).unwrap(), settings);
    }
}
