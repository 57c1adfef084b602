//! Routing of backend events to store handlers
//!
//! Every [`BackendEvent`] variant maps to exactly one handler. Async
//! handlers are awaited inside [`Dispatcher::dispatch`], so as long as the
//! caller awaits each dispatch the stores see events in emission order.

pub mod handlers;

use serde::Serialize;
use serde_json::Value;

use crate::actions::Actions;
use crate::events::{BackendEvent, CriticalProblem, EventEnvelope};
use handlers::{Gate, Pool};

/// Title of the installation-location diagnostic
pub const INSTALL_LOCATION_TITLE: &str = "installation-location-problem";
/// Description of the installation-location diagnostic
pub const INSTALL_LOCATION_DESCRIPTION: &str = "installation-location-problem-description";

/// Remembers the last logged event so repeats are not logged again
#[derive(Debug, Default)]
pub struct LogDedup {
    last: Option<BackendEvent>,
}

impl LogDedup {
    /// Returns true if the event should be logged
    pub fn observe(&mut self, event: &BackendEvent) -> bool {
        if !event.is_log_tracked() || self.last.as_ref() == Some(event) {
            return false;
        }
        self.last = Some(event.clone());
        true
    }
}

/// Counters for what the dispatcher has seen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub handled: u64,
    pub unrecognized: u64,
    pub logged: u64,
}

/// Whether a critical problem is the installation-location diagnostic
pub fn is_install_location_problem(problem: &CriticalProblem) -> bool {
    problem.title.as_deref() == Some(INSTALL_LOCATION_TITLE)
        && problem.description.as_deref() == Some(INSTALL_LOCATION_DESCRIPTION)
}

pub struct Dispatcher {
    actions: Actions,
    dedup: LogDedup,
    stats: DispatchStats,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("dedup", &self.dedup)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(actions: Actions) -> Self {
        Self {
            actions,
            dedup: LogDedup::default(),
            stats: DispatchStats::default(),
        }
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Decode a raw channel message and dispatch it
    pub async fn dispatch_raw(&mut self, message: Value) {
        match serde_json::from_value::<EventEnvelope>(message) {
            Ok(envelope) => self.dispatch(envelope).await,
            Err(e) => {
                tracing::warn!("Dropping malformed backend message: {}", e);
                self.stats.unrecognized += 1;
            }
        }
    }

    pub async fn dispatch(&mut self, envelope: EventEnvelope) {
        match envelope {
            EventEnvelope::Known(event) => {
                if self.dedup.observe(&event) {
                    tracing::info!("Backend event: {:?}", event);
                    self.stats.logged += 1;
                }
                self.route(event).await;
                self.stats.handled += 1;
            }
            EventEnvelope::Unrecognized(raw) => {
                tracing::warn!("Unhandled backend event: {}", raw.event_type);
                self.stats.unrecognized += 1;
            }
        }
    }

    async fn route(&self, event: BackendEvent) {
        let actions = &self.actions;
        let stores = actions.stores();

        match event {
            BackendEvent::WalletAddressUpdate(address) => handlers::wallet_address(stores, address),
            BackendEvent::WalletBalanceUpdate(balance) => handlers::wallet_balance(stores, balance),
            BackendEvent::BaseNodeUpdate(status) => handlers::base_node(stores, status),
            BackendEvent::GpuDevicesUpdate(devices) => handlers::gpu_devices(stores, devices),
            BackendEvent::CpuMiningUpdate(status) => handlers::cpu_miner(stores, status),
            BackendEvent::GpuMiningUpdate(status) => handlers::gpu_miner(stores, status),
            BackendEvent::ConnectedPeersUpdate(peers) => handlers::connected_peers(stores, peers),
            BackendEvent::NewBlockHeight(block) => handlers::new_block(actions, block).await,
            BackendEvent::ConfigCoreLoaded(config) => handlers::core_config(stores, config),
            BackendEvent::ConfigWalletLoaded(config) => handlers::wallet_config(stores, config),
            BackendEvent::ConfigMiningLoaded(config) => handlers::mining_config(stores, config),
            BackendEvent::ConfigUiLoaded(config) => handlers::ui_config(stores, config),
            BackendEvent::ConfigInMemoryLoaded(config) => {
                handlers::in_memory_config(stores, config)
            }
            BackendEvent::CloseSplashscreen => handlers::close_splashscreen(stores),
            BackendEvent::DetectedAvailableGpuEngines(engines) => {
                handlers::gpu_engines(stores, engines)
            }
            BackendEvent::CriticalProblem(problem) if is_install_location_problem(&problem) => {
                handlers::set_critical_error(stores, problem)
            }
            BackendEvent::CriticalProblem(problem) => handlers::critical_problem(stores, problem),
            BackendEvent::MissingApplications(apps) => handlers::missing_applications(stores, apps),
            BackendEvent::StuckOnOrphanChain(stuck) => {
                handlers::stuck_on_orphan_chain(stores, stuck)
            }
            BackendEvent::NetworkStatus(status) => handlers::network_status(stores, status),
            BackendEvent::NodeTypeUpdate(update) => handlers::node_type(stores, update),
            BackendEvent::RestartingPhases(phases) => handlers::restarting_phases(stores, phases),
            BackendEvent::AskForRestart => handlers::ask_for_restart(stores),
            BackendEvent::BackgroundNodeSyncUpdate(sync) => handlers::background_sync(stores, sync),
            BackendEvent::InitWalletScanningProgress(progress) => {
                handlers::wallet_scanning(stores, progress)
            }
            BackendEvent::ConnectionStatus(status) => handlers::connection_status(stores, status),
            BackendEvent::ShowReleaseNotes(notes) => handlers::release_notes(stores, notes),
            BackendEvent::ShouldShowExchangeMinerModal => handlers::exchange_miner_modal(stores),
            BackendEvent::SelectedTariAddressChanged(address) => {
                handlers::selected_address(stores, address)
            }
            BackendEvent::PendingTransactionsUpdate(txs) => {
                handlers::pending_transactions(stores, txs)
            }
            BackendEvent::SetupPhaseUpdate(progress) => handlers::setup_progress(stores, progress),
            BackendEvent::SetupPhaseFinished(finished) => {
                handlers::setup_finished(stores, finished)
            }
            BackendEvent::UnlockApp => handlers::set_gate(stores, Gate::App, true),
            BackendEvent::UnlockWallet => handlers::set_gate(stores, Gate::Wallet, true),
            BackendEvent::UnlockCpuMining => {
                handlers::unlock_mining(actions, Gate::CpuMining).await
            }
            BackendEvent::UnlockGpuMining => {
                handlers::unlock_mining(actions, Gate::GpuMining).await
            }
            BackendEvent::LockWallet => handlers::set_gate(stores, Gate::Wallet, false),
            BackendEvent::LockCpuMining => handlers::set_gate(stores, Gate::CpuMining, false),
            BackendEvent::LockGpuMining => handlers::set_gate(stores, Gate::GpuMining, false),
            BackendEvent::DisabledPhases(phases) => handlers::disabled_phases(stores, phases),
            BackendEvent::CpuPoolStatsUpdate(stats) => {
                handlers::pool_stats(stores, Pool::Cpu, stats)
            }
            BackendEvent::GpuPoolStatsUpdate(stats) => {
                handlers::pool_stats(stores, Pool::Gpu, stats)
            }
            BackendEvent::MiningTime(time) => handlers::mining_time(stores, time),
            BackendEvent::ExchangeIdChanged(id) => handlers::exchange_id(stores, id),
            BackendEvent::UpdateTorEntryGuards(guards) => handlers::tor_entry_guards(stores, guards),
            BackendEvent::ShowStageSecurityModal => handlers::stage_security_modal(stores),
            BackendEvent::PinLocked(locked) => handlers::pin_locked(stores, locked),
            BackendEvent::SeedBackedUp(backed_up) => handlers::seed_backed_up(stores, backed_up),
            BackendEvent::AllowTappletsCsp(csp) => handlers::tapplets_csp(stores, csp),
            BackendEvent::UpdateAppModuleStatus(status) => handlers::module_status(stores, status),
        }
    }
}
