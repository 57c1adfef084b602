use serde::{Deserialize, Serialize};

/// Where the client gets chain data from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeType {
    #[default]
    Local,
    Remote,
    RemoteUntilLocal,
}

/// Mining intensity preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MiningMode {
    #[default]
    Eco,
    Ludicrous,
    Custom,
}

/// Colour scheme selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    System,
    Light,
    Dark,
}

/// Core application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default = "default_true")]
    pub allow_telemetry: bool,
    #[serde(default = "default_true")]
    pub auto_update: bool,
    #[serde(default)]
    pub pre_release: bool,
    #[serde(default)]
    pub should_auto_launch: bool,
    #[serde(default)]
    pub node_type: NodeType,
    #[serde(default = "default_true")]
    pub use_tor: bool,
    #[serde(default = "default_true")]
    pub p2pool_enabled: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            allow_telemetry: true,
            auto_update: true,
            pre_release: false,
            should_auto_launch: false,
            node_type: NodeType::default(),
            use_tor: true,
            p2pool_enabled: true,
        }
    }
}

/// Wallet settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Payout address used for merge-mined Monero rewards
    #[serde(default)]
    pub monero_address: String,
    /// User-supplied address replacing the generated one
    #[serde(default)]
    pub external_tari_address: Option<String>,
}

/// Mining settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningConfig {
    #[serde(default)]
    pub mode: MiningMode,
    /// Thread share for custom mode, in percent
    #[serde(default = "default_custom_usage")]
    pub custom_max_cpu_usage: u32,
    #[serde(default = "default_custom_usage")]
    pub custom_max_gpu_usage: u32,
    #[serde(default = "default_true")]
    pub cpu_mining_enabled: bool,
    #[serde(default = "default_true")]
    pub gpu_mining_enabled: bool,
    #[serde(default)]
    pub mine_on_app_start: bool,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            mode: MiningMode::default(),
            custom_max_cpu_usage: default_custom_usage(),
            custom_max_gpu_usage: default_custom_usage(),
            cpu_mining_enabled: true,
            gpu_mining_enabled: true,
            mine_on_app_start: false,
        }
    }
}

/// Presentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub display_mode: DisplayMode,
    #[serde(default = "default_language")]
    pub application_language: String,
    #[serde(default = "default_true")]
    pub visual_mode: bool,
    #[serde(default)]
    pub show_experimental_settings: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            display_mode: DisplayMode::default(),
            application_language: default_language(),
            visual_mode: true,
            show_experimental_settings: false,
        }
    }
}

/// Per-session values handed over by the backend, never persisted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InMemoryConfig {
    #[serde(default)]
    pub exchange_id: Option<String>,
    #[serde(default)]
    pub airdrop_url: String,
    #[serde(default)]
    pub telemetry_api_url: String,
}

fn default_true() -> bool {
    true
}

fn default_custom_usage() -> u32 {
    50
}

fn default_language() -> String {
    "en".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_payload_uses_defaults() {
        let mining: MiningConfig = serde_json::from_str(r#"{"mode":"Ludicrous"}"#).unwrap();
        assert_eq!(mining.mode, MiningMode::Ludicrous);
        assert!(mining.cpu_mining_enabled);
        assert_eq!(mining.custom_max_cpu_usage, 50);

        let ui: UiConfig = serde_json::from_str(r#"{"display_mode":"dark"}"#).unwrap();
        assert_eq!(ui.display_mode, DisplayMode::Dark);
        assert_eq!(ui.application_language, "en");
    }

    #[test]
    fn test_core_defaults() {
        let core: CoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(core, CoreConfig::default());
        assert_eq!(core.node_type, NodeType::Local);
    }
}
