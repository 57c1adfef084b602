//! Setup and unlock state

use std::collections::BTreeMap;

use serde::Serialize;

use crate::events::{AppModule, ModuleStatus, SetupPhase, SetupProgress};

/// Setup pipeline state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SetupState {
    /// Latest progress report per phase
    pub phases: BTreeMap<SetupPhase, SetupProgress>,
    /// Phases that finished, with their outcome
    pub finished: BTreeMap<SetupPhase, bool>,
    pub app_unlocked: bool,
    pub wallet_unlocked: bool,
    pub cpu_mining_unlocked: bool,
    pub gpu_mining_unlocked: bool,
    pub disabled_phases: Vec<SetupPhase>,
    pub restarting_phases: Vec<SetupPhase>,
    pub splashscreen_closed: bool,
    pub module_statuses: BTreeMap<AppModule, ModuleStatus>,
}

impl SetupState {
    /// Mean progress across reported phases, 0.0 - 1.0
    pub fn overall_progress(&self) -> f64 {
        if self.phases.is_empty() {
            return 0.0;
        }
        let total: f64 = self.phases.values().map(|p| p.progress.clamp(0.0, 1.0)).sum();
        total / self.phases.len() as f64
    }
}
