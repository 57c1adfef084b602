//! Backend state-update events
//!
//! Every message on the backend state channel has the wire shape
//! `{ "event_type": <Name>, "payload": <shape> }`. Known names decode into
//! [`BackendEvent`]; anything else is kept as [`EventEnvelope::Unrecognized`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{CoreConfig, InMemoryConfig, MiningConfig, NodeType, UiConfig, WalletConfig};

/// Wallet balance in micro units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalance {
    pub available_balance: u64,
    pub timelocked_balance: u64,
    pub pending_incoming_balance: u64,
    pub pending_outgoing_balance: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletAddress {
    pub tari_address_base58: String,
    pub tari_address_emoji: String,
    #[serde(default)]
    pub is_tari_address_generated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AddressType {
    #[default]
    Internal,
    External,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedAddress {
    pub tari_address_base58: String,
    pub tari_address_emoji: String,
    pub tari_address_type: AddressType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub tx_id: String,
    pub amount: u64,
    #[serde(default)]
    pub mined_in_block_height: Option<u64>,
    #[serde(default)]
    pub is_coinbase: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseNodeStatus {
    pub block_height: u64,
    pub block_time: u64,
    pub is_synced: bool,
    #[serde(default)]
    pub num_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuDevice {
    pub device_index: u32,
    pub device_name: String,
    #[serde(default)]
    pub excluded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuMinerStatus {
    pub is_mining: bool,
    pub hash_rate: f64,
    #[serde(default)]
    pub estimated_earnings: u64,
    #[serde(default)]
    pub is_connected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpuMinerStatus {
    pub is_mining: bool,
    pub hash_rate: f64,
    #[serde(default)]
    pub estimated_earnings: u64,
    #[serde(default)]
    pub is_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBlock {
    pub height: u64,
    #[serde(default)]
    pub coinbase_transaction: Option<Transaction>,
    #[serde(default)]
    pub balance: Option<WalletBalance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuEngines {
    pub engines: Vec<String>,
    pub selected_engine: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalProblem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkStatus {
    pub download_speed: f64,
    pub upload_speed: f64,
    pub latency: f64,
    #[serde(default)]
    pub is_too_low: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIdentity {
    pub public_key: String,
    #[serde(default)]
    pub public_addresses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTypeUpdate {
    #[serde(default)]
    pub node_type: Option<NodeType>,
    #[serde(default)]
    pub node_identity: Option<NodeIdentity>,
    #[serde(default)]
    pub node_connection_address: Option<String>,
}

/// Setup pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SetupPhase {
    Core,
    Wallet,
    Node,
    CpuMining,
    GpuMining,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundNodeSync {
    pub step: String,
    pub progress: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletScanningProgress {
    pub scanned_height: u64,
    pub total_height: u64,
    pub progress: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionStatus {
    #[default]
    Connected,
    Disconnected,
    DisconnectedFailed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseNotes {
    pub release_notes: String,
    #[serde(default)]
    pub is_app_update_available: bool,
    #[serde(default)]
    pub should_show_dialog: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupProgress {
    pub phase: SetupPhase,
    pub title: String,
    pub progress: f64,
    #[serde(default)]
    pub is_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupPhaseFinished {
    pub phase: SetupPhase,
    pub is_successful: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolStats {
    pub accepted_shares: u64,
    pub unpaid: u64,
    #[serde(default)]
    pub min_payout: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningTime {
    pub mining_time_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AppModule {
    MainApp,
    Wallet,
    CpuMining,
    GpuMining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleStatusKind {
    Initializing,
    Initialized,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleStatus {
    pub module: AppModule,
    pub status: ModuleStatusKind,
    #[serde(default)]
    pub error_messages: Vec<String>,
}

/// Typed backend state-update event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "payload")]
pub enum BackendEvent {
    WalletAddressUpdate(WalletAddress),
    WalletBalanceUpdate(WalletBalance),
    BaseNodeUpdate(BaseNodeStatus),
    GpuDevicesUpdate(Vec<GpuDevice>),
    CpuMiningUpdate(CpuMinerStatus),
    GpuMiningUpdate(GpuMinerStatus),
    ConnectedPeersUpdate(Vec<String>),
    NewBlockHeight(NewBlock),
    ConfigCoreLoaded(CoreConfig),
    ConfigWalletLoaded(WalletConfig),
    ConfigMiningLoaded(MiningConfig),
    #[serde(rename = "ConfigUILoaded")]
    ConfigUiLoaded(UiConfig),
    ConfigInMemoryLoaded(InMemoryConfig),
    CloseSplashscreen,
    DetectedAvailableGpuEngines(GpuEngines),
    CriticalProblem(CriticalProblem),
    MissingApplications(Vec<String>),
    StuckOnOrphanChain(bool),
    NetworkStatus(NetworkStatus),
    NodeTypeUpdate(NodeTypeUpdate),
    RestartingPhases(Vec<SetupPhase>),
    AskForRestart,
    BackgroundNodeSyncUpdate(BackgroundNodeSync),
    InitWalletScanningProgress(WalletScanningProgress),
    ConnectionStatus(ConnectionStatus),
    ShowReleaseNotes(ReleaseNotes),
    ShouldShowExchangeMinerModal,
    SelectedTariAddressChanged(SelectedAddress),
    PendingTransactionsUpdate(Vec<Transaction>),
    SetupPhaseUpdate(SetupProgress),
    SetupPhaseFinished(SetupPhaseFinished),
    UnlockApp,
    UnlockWallet,
    UnlockCpuMining,
    UnlockGpuMining,
    LockWallet,
    LockCpuMining,
    LockGpuMining,
    DisabledPhases(Vec<SetupPhase>),
    CpuPoolStatsUpdate(PoolStats),
    GpuPoolStatsUpdate(PoolStats),
    MiningTime(MiningTime),
    ExchangeIdChanged(String),
    UpdateTorEntryGuards(Vec<String>),
    ShowStageSecurityModal,
    PinLocked(bool),
    SeedBackedUp(bool),
    AllowTappletsCsp(String),
    UpdateAppModuleStatus(ModuleStatus),
}

impl BackendEvent {
    /// Only these kinds are written to the log, and only when they change
    pub fn is_log_tracked(&self) -> bool {
        matches!(
            self,
            BackendEvent::WalletAddressUpdate(_)
                | BackendEvent::CriticalProblem(_)
                | BackendEvent::MissingApplications(_)
        )
    }
}

/// Fallback shape for messages that do not decode as a known event
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnrecognizedEvent {
    pub event_type: String,
    #[serde(default)]
    pub payload: Value,
}

/// One message from the backend state channel
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EventEnvelope {
    Known(BackendEvent),
    Unrecognized(UnrecognizedEvent),
}

impl From<BackendEvent> for EventEnvelope {
    fn from(event: BackendEvent) -> Self {
        EventEnvelope::Known(event)
    }
}
