//! Mining runtime state

use serde::Serialize;

use crate::events::{CpuMinerStatus, GpuDevice, GpuMinerStatus, PoolStats};

/// Mining-related runtime state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MiningState {
    /// Latest CPU miner status from the backend
    pub cpu: CpuMinerStatus,
    /// Latest GPU miner status from the backend
    pub gpu: GpuMinerStatus,
    /// Detected GPU devices with their exclusion flags
    pub gpu_devices: Vec<GpuDevice>,
    /// Whether the user asked for mining to run (intent, not activity)
    pub mining_initiated: bool,
    pub cpu_pool_stats: Option<PoolStats>,
    pub gpu_pool_stats: Option<PoolStats>,
    pub mining_time_ms: u64,
    pub available_gpu_engines: Vec<String>,
    pub selected_gpu_engine: Option<String>,
}

impl MiningState {
    /// Whether any modality is currently running
    pub fn is_mining(&self) -> bool {
        self.cpu.is_mining || self.gpu.is_mining
    }

    /// Indexes of devices the user opted out of
    pub fn excluded_devices(&self) -> Vec<u32> {
        self.gpu_devices
            .iter()
            .filter(|d| d.excluded)
            .map(|d| d.device_index)
            .collect()
    }
}
