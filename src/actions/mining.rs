//! Mining start/stop actions

use super::Actions;
use crate::backend::Command;
use crate::state::MiningState;

#[derive(Debug, Clone, Copy)]
enum Modality {
    Cpu,
    Gpu,
}

impl Modality {
    fn label(self) -> &'static str {
        match self {
            Modality::Cpu => "CPU",
            Modality::Gpu => "GPU",
        }
    }

    fn set_mining(self, state: &mut MiningState, running: bool) {
        match self {
            Modality::Cpu => state.cpu.is_mining = running,
            Modality::Gpu => state.gpu.is_mining = running,
        }
    }
}

impl Actions {
    /// Record the user's intent to mine and start every enabled, unlocked modality
    pub async fn start_mining(&self) {
        self.stores.mining.update(|m| m.mining_initiated = true);

        let config = self.stores.mining_config.get();
        let (cpu_unlocked, gpu_unlocked) = self
            .stores
            .setup
            .read(|s| (s.cpu_mining_unlocked, s.gpu_mining_unlocked));

        tracing::info!("Starting mining");
        if config.cpu_mining_enabled && cpu_unlocked {
            self.start_cpu_mining().await;
        }
        if config.gpu_mining_enabled && gpu_unlocked {
            self.start_gpu_mining().await;
        }
    }

    /// Clear the mining intent and stop whatever is running
    pub async fn stop_mining(&self) {
        self.stores.mining.update(|m| m.mining_initiated = false);

        let (cpu, gpu) = self.stores.mining.read(|m| (m.cpu.is_mining, m.gpu.is_mining));
        tracing::info!("Stopping mining");
        if cpu {
            self.stop_cpu_mining().await;
        }
        if gpu {
            self.stop_gpu_mining().await;
        }
    }

    /// Stop and start again so the backend picks up new settings.
    /// Does nothing unless the user asked to mine.
    pub async fn restart_mining(&self) {
        if !self.stores.mining.read(|m| m.mining_initiated) {
            return;
        }
        tracing::info!("Restarting mining");
        self.stop_mining().await;
        self.start_mining().await;
    }

    pub async fn start_cpu_mining(&self) -> bool {
        self.switch(Modality::Cpu, Command::StartCpuMining, true).await
    }

    pub async fn stop_cpu_mining(&self) -> bool {
        self.switch(Modality::Cpu, Command::StopCpuMining, false).await
    }

    pub async fn start_gpu_mining(&self) -> bool {
        self.switch(Modality::Gpu, Command::StartGpuMining, true).await
    }

    pub async fn stop_gpu_mining(&self) -> bool {
        self.switch(Modality::Gpu, Command::StopGpuMining, false).await
    }

    async fn switch(&self, modality: Modality, command: Command, running: bool) -> bool {
        let verb = if running { "start" } else { "stop" };
        match self.backend.invoke(command).await {
            Ok(_) => {
                self.stores
                    .mining
                    .update(|m| modality.set_mining(m, running));
                true
            }
            Err(e) => {
                tracing::error!("Failed to {} {} mining: {}", verb, modality.label(), e);
                self.stores
                    .raise_error(format!("Failed to {} {} mining", verb, modality.label()));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::backend::RecordingBackend;
    use crate::state::Stores;

    fn setup() -> (Arc<RecordingBackend>, Actions) {
        let backend = Arc::new(RecordingBackend::new());
        let stores = Stores::default();
        stores.setup.update(|s| {
            s.cpu_mining_unlocked = true;
            s.gpu_mining_unlocked = true;
        });
        (backend.clone(), Actions::new(backend, stores))
    }

    #[tokio::test]
    async fn test_start_respects_enabled_flags() {
        let (backend, actions) = setup();
        actions
            .stores()
            .mining_config
            .update(|m| m.gpu_mining_enabled = false);

        actions.start_mining().await;

        let mining = actions.stores().mining.get();
        assert!(mining.mining_initiated);
        assert!(mining.cpu.is_mining);
        assert!(!mining.gpu.is_mining);
        assert_eq!(backend.call_names(), vec!["start_cpu_mining"]);
    }

    #[tokio::test]
    async fn test_stop_clears_intent() {
        let (backend, actions) = setup();
        actions.start_mining().await;
        actions.stop_mining().await;

        let mining = actions.stores().mining.get();
        assert!(!mining.mining_initiated);
        assert!(!mining.is_mining());
        assert_eq!(
            backend.call_names(),
            vec![
                "start_cpu_mining",
                "start_gpu_mining",
                "stop_cpu_mining",
                "stop_gpu_mining"
            ]
        );
    }

    #[tokio::test]
    async fn test_restart_needs_intent() {
        let (backend, actions) = setup();
        actions.restart_mining().await;
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_start_raises_error() {
        let (backend, actions) = setup();
        backend.reject("start_gpu_mining");

        assert!(!actions.start_gpu_mining().await);

        let stores = actions.stores();
        assert!(!stores.mining.get().gpu.is_mining);
        assert_eq!(
            stores.errors.get().raised[0].message,
            "Failed to start GPU mining"
        );
    }
}
