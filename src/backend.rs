//! Request/response channel to the native backend
//!
//! Commands are sent by stable name with a named-argument bundle. The crate
//! only depends on the [`Backend`] trait; [`RecordingBackend`] is an
//! in-process implementation that accepts everything except the command
//! names it is told to reject.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::{DisplayMode, MiningMode, NodeType};

/// Errors returned by the backend channel
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Backend rejected {command}: {reason}")]
    Rejected { command: String, reason: String },

    #[error("Unexpected backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A command understood by the backend
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", content = "args", rename_all = "snake_case")]
pub enum Command {
    FrontendReady,
    SetAllowTelemetry { allow_telemetry: bool },
    SetAutoUpdate { auto_update: bool },
    SetPreRelease { pre_release: bool },
    SetShouldAutoLaunch { should_auto_launch: bool },
    SetNodeType { node_type: NodeType },
    SetUseTor { use_tor: bool },
    SetP2poolEnabled { p2pool_enabled: bool },
    SetMoneroAddress { monero_address: String },
    SetExternalTariAddress { address: Option<String> },
    SetMode {
        mode: MiningMode,
        custom_cpu_usage: u32,
        custom_gpu_usage: u32,
    },
    SetMineOnAppStart { mine_on_app_start: bool },
    SetCpuMiningEnabled { enabled: bool },
    SetGpuMiningEnabled { enabled: bool },
    SetExcludedGpuDevices { excluded_gpu_devices: Vec<u32> },
    SetDisplayMode { display_mode: DisplayMode },
    SetApplicationLanguage { application_language: String },
    SetVisualMode { enabled: bool },
    SetShowExperimentalSettings { show_experimental_settings: bool },
    StartCpuMining,
    StopCpuMining,
    StartGpuMining,
    StopGpuMining,
    GetTransactions { limit: usize },
}

impl Command {
    /// Stable name the backend dispatches on
    pub fn name(&self) -> &'static str {
        match self {
            Command::FrontendReady => "frontend_ready",
            Command::SetAllowTelemetry { .. } => "set_allow_telemetry",
            Command::SetAutoUpdate { .. } => "set_auto_update",
            Command::SetPreRelease { .. } => "set_pre_release",
            Command::SetShouldAutoLaunch { .. } => "set_should_auto_launch",
            Command::SetNodeType { .. } => "set_node_type",
            Command::SetUseTor { .. } => "set_use_tor",
            Command::SetP2poolEnabled { .. } => "set_p2pool_enabled",
            Command::SetMoneroAddress { .. } => "set_monero_address",
            Command::SetExternalTariAddress { .. } => "set_external_tari_address",
            Command::SetMode { .. } => "set_mode",
            Command::SetMineOnAppStart { .. } => "set_mine_on_app_start",
            Command::SetCpuMiningEnabled { .. } => "set_cpu_mining_enabled",
            Command::SetGpuMiningEnabled { .. } => "set_gpu_mining_enabled",
            Command::SetExcludedGpuDevices { .. } => "set_excluded_gpu_devices",
            Command::SetDisplayMode { .. } => "set_display_mode",
            Command::SetApplicationLanguage { .. } => "set_application_language",
            Command::SetVisualMode { .. } => "set_visual_mode",
            Command::SetShowExperimentalSettings { .. } => "set_show_experimental_settings",
            Command::StartCpuMining => "start_cpu_mining",
            Command::StopCpuMining => "stop_cpu_mining",
            Command::StartGpuMining => "start_gpu_mining",
            Command::StopGpuMining => "stop_gpu_mining",
            Command::GetTransactions { .. } => "get_transactions",
        }
    }
}

/// The native process that owns mining, node and wallet logic
#[async_trait]
pub trait Backend: Send + Sync {
    /// Send a command and wait for its response
    async fn invoke(&self, command: Command) -> Result<Value, BackendError>;
}

/// In-process backend that records every command it receives
#[derive(Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<Command>>,
    rejected: Mutex<HashSet<String>>,
    responses: Mutex<HashMap<String, Value>>,
    delays: Mutex<HashMap<String, VecDeque<Duration>>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every future command with this name
    pub fn reject(&self, name: &str) {
        lock(&self.rejected).insert(name.to_string());
    }

    /// Answer commands with this name using a fixed value
    pub fn respond_with(&self, name: &str, value: Value) {
        lock(&self.responses).insert(name.to_string(), value);
    }

    /// Delay the next calls of this command, one entry per call
    pub fn delay_next(&self, name: &str, delays: impl IntoIterator<Item = Duration>) {
        lock(&self.delays)
            .entry(name.to_string())
            .or_default()
            .extend(delays);
    }

    /// Every command received so far, in arrival order
    pub fn calls(&self) -> Vec<Command> {
        lock(&self.calls).clone()
    }

    /// Names of the commands received so far
    pub fn call_names(&self) -> Vec<&'static str> {
        lock(&self.calls).iter().map(Command::name).collect()
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    async fn invoke(&self, command: Command) -> Result<Value, BackendError> {
        let name = command.name();
        lock(&self.calls).push(command);

        let delay = {
            let mut delays = lock(&self.delays);
            delays.get_mut(name).and_then(VecDeque::pop_front)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if lock(&self.rejected).contains(name) {
            return Err(BackendError::Rejected {
                command: name.to_string(),
                reason: "rejected by recording backend".to_string(),
            });
        }

        Ok(lock(&self.responses).get(name).cloned().unwrap_or(Value::Null))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
