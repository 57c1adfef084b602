//! Per-event store updates
//!
//! Handlers own their failures: nothing in here returns an error to the
//! dispatcher.

use crate::actions::Actions;
use crate::backend::{Backend, BackendError, Command};
use crate::config::{CoreConfig, InMemoryConfig, MiningConfig, UiConfig, WalletConfig};
use crate::events::{
    BackgroundNodeSync, BaseNodeStatus, ConnectionStatus, CpuMinerStatus,
    CriticalProblem, GpuDevice, GpuEngines, GpuMinerStatus, MiningTime, ModuleStatus,
    NetworkStatus, NewBlock, NodeTypeUpdate, PoolStats, ReleaseNotes, SelectedAddress,
    SetupPhase, SetupPhaseFinished, SetupProgress, Transaction, WalletAddress, WalletBalance,
    WalletScanningProgress,
};
use crate::state::{CriticalError, RECENT_TRANSACTIONS, Stores};

/// Something the backend locks while it is not ready
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    App,
    Wallet,
    CpuMining,
    GpuMining,
}

/// Which pool a stats update belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    Cpu,
    Gpu,
}

// Wallet

pub fn wallet_address(stores: &Stores, address: WalletAddress) {
    stores.wallet.update(|w| {
        w.address_base58 = address.tari_address_base58;
        w.address_emoji = address.tari_address_emoji;
        w.is_address_generated = address.is_tari_address_generated;
    });
}

pub fn wallet_balance(stores: &Stores, balance: WalletBalance) {
    stores.wallet.update(|w| w.balance = Some(balance));
}

pub fn selected_address(stores: &Stores, address: SelectedAddress) {
    stores.wallet.update(|w| {
        w.address_base58 = address.tari_address_base58;
        w.address_emoji = address.tari_address_emoji;
        w.selected_address_type = address.tari_address_type;
    });
}

pub fn pending_transactions(stores: &Stores, transactions: Vec<Transaction>) {
    stores.wallet.update(|w| w.pending_transactions = transactions);
}

pub fn wallet_scanning(stores: &Stores, progress: WalletScanningProgress) {
    stores.wallet.update(|w| w.scanning = progress);
}

pub fn pin_locked(stores: &Stores, locked: bool) {
    stores.wallet.update(|w| w.is_pin_locked = locked);
}

pub fn seed_backed_up(stores: &Stores, backed_up: bool) {
    stores.wallet.update(|w| w.is_seed_backed_up = backed_up);
}

/// Apply the new tip, then refresh recent transactions if the wallet is open
pub async fn new_block(actions: &Actions, block: NewBlock) {
    let stores = actions.stores();
    let height = block.height;

    stores.node.update(|n| n.block_height = height);
    stores.wallet.update(|w| {
        if let Some(balance) = block.balance {
            w.balance = Some(balance);
        }
        if let Some(tx) = block.coinbase_transaction {
            w.push_transaction(tx);
        }
    });

    if !stores.setup.read(|s| s.wallet_unlocked) {
        return;
    }

    match recent_transactions(actions.backend().as_ref()).await {
        Ok(Some(transactions)) => {
            stores.wallet.update(|w| {
                w.transactions = transactions;
                w.transactions.truncate(RECENT_TRANSACTIONS);
            });
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!("Failed to refresh transactions at height {}: {}", height, e);
        }
    }
}

/// Latest wallet transactions; `None` when the wallet has nothing to report
pub async fn recent_transactions(
    backend: &dyn Backend,
) -> Result<Option<Vec<Transaction>>, BackendError> {
    let response = backend
        .invoke(Command::GetTransactions {
            limit: RECENT_TRANSACTIONS,
        })
        .await?;
    Ok(serde_json::from_value(response)?)
}

// Node

pub fn base_node(stores: &Stores, status: BaseNodeStatus) {
    stores.node.update(|n| {
        n.block_height = status.block_height;
        n.block_time = status.block_time;
        n.is_synced = status.is_synced;
        n.num_connections = status.num_connections;
    });
}

pub fn connected_peers(stores: &Stores, peers: Vec<String>) {
    stores.node.update(|n| n.connected_peers = peers);
}

pub fn node_type(stores: &Stores, update: NodeTypeUpdate) {
    stores.node.update(|n| {
        if let Some(node_type) = update.node_type {
            n.node_type = node_type;
        }
        if let Some(identity) = update.node_identity {
            n.node_identity = Some(identity);
        }
        if let Some(address) = update.node_connection_address {
            n.node_connection_address = Some(address);
        }
    });
}

pub fn connection_status(stores: &Stores, status: ConnectionStatus) {
    stores.node.update(|n| n.connection_status = status);
}

pub fn stuck_on_orphan_chain(stores: &Stores, stuck: bool) {
    stores.node.update(|n| n.stuck_on_orphan_chain = stuck);
}

pub fn background_sync(stores: &Stores, sync: BackgroundNodeSync) {
    stores.node.update(|n| n.background_sync = Some(sync));
}

pub fn network_status(stores: &Stores, status: NetworkStatus) {
    stores.node.update(|n| n.network_status = Some(status));
}

pub fn tor_entry_guards(stores: &Stores, guards: Vec<String>) {
    stores.node.update(|n| n.tor_entry_guards = guards);
}

// Mining

pub fn gpu_devices(stores: &Stores, devices: Vec<GpuDevice>) {
    stores.mining.update(|m| m.gpu_devices = devices);
}

pub fn cpu_miner(stores: &Stores, status: CpuMinerStatus) {
    stores.mining.update(|m| m.cpu = status);
}

pub fn gpu_miner(stores: &Stores, status: GpuMinerStatus) {
    stores.mining.update(|m| m.gpu = status);
}

pub fn gpu_engines(stores: &Stores, engines: GpuEngines) {
    stores.mining.update(|m| {
        m.available_gpu_engines = engines.engines;
        m.selected_gpu_engine = Some(engines.selected_engine);
    });
}

pub fn pool_stats(stores: &Stores, pool: Pool, stats: PoolStats) {
    stores.mining.update(|m| match pool {
        Pool::Cpu => m.cpu_pool_stats = Some(stats),
        Pool::Gpu => m.gpu_pool_stats = Some(stats),
    });
}

pub fn mining_time(stores: &Stores, time: MiningTime) {
    stores.mining.update(|m| m.mining_time_ms = time.mining_time_ms);
}

// Config

pub fn core_config(stores: &Stores, config: CoreConfig) {
    let node_type = config.node_type;
    stores.core_config.replace(config);
    stores.node.update(|n| n.node_type = node_type);
}

pub fn wallet_config(stores: &Stores, config: WalletConfig) {
    stores.wallet_config.replace(config);
}

pub fn mining_config(stores: &Stores, config: MiningConfig) {
    stores.mining_config.replace(config);
}

pub fn ui_config(stores: &Stores, config: UiConfig) {
    stores.ui_config.replace(config);
}

pub fn in_memory_config(stores: &Stores, config: InMemoryConfig) {
    stores.in_memory_config.replace(config);
}

pub fn exchange_id(stores: &Stores, exchange_id: String) {
    stores
        .in_memory_config
        .update(|c| c.exchange_id = Some(exchange_id));
}

// Setup

pub fn setup_progress(stores: &Stores, progress: SetupProgress) {
    stores.setup.update(|s| {
        s.phases.insert(progress.phase, progress);
    });
}

pub fn setup_finished(stores: &Stores, finished: SetupPhaseFinished) {
    stores.setup.update(|s| {
        s.finished.insert(finished.phase, finished.is_successful);
        s.restarting_phases.retain(|p| *p != finished.phase);
    });
}

pub fn restarting_phases(stores: &Stores, phases: Vec<SetupPhase>) {
    stores.setup.update(|s| {
        for phase in &phases {
            s.finished.remove(phase);
        }
        s.restarting_phases = phases;
    });
}

pub fn disabled_phases(stores: &Stores, phases: Vec<SetupPhase>) {
    stores.setup.update(|s| s.disabled_phases = phases);
}

pub fn close_splashscreen(stores: &Stores) {
    stores.setup.update(|s| s.splashscreen_closed = true);
}

pub fn module_status(stores: &Stores, status: ModuleStatus) {
    let module = status.module;
    stores.setup.update(|s| {
        s.module_statuses.insert(module, status);
    });
}

pub fn set_gate(stores: &Stores, gate: Gate, unlocked: bool) {
    stores.setup.update(|s| match gate {
        Gate::App => s.app_unlocked = unlocked,
        Gate::Wallet => s.wallet_unlocked = unlocked,
        Gate::CpuMining => s.cpu_mining_unlocked = unlocked,
        Gate::GpuMining => s.gpu_mining_unlocked = unlocked,
    });
}

/// Unlock a mining modality and honour mine-on-start once every enabled
/// modality is available
pub async fn unlock_mining(actions: &Actions, gate: Gate) {
    let stores = actions.stores();
    set_gate(stores, gate, true);

    let config = stores.mining_config.get();
    if !config.mine_on_app_start || !(config.cpu_mining_enabled || config.gpu_mining_enabled) {
        return;
    }
    let (cpu_unlocked, gpu_unlocked) = stores
        .setup
        .read(|s| (s.cpu_mining_unlocked, s.gpu_mining_unlocked));
    let ready = (!config.cpu_mining_enabled || cpu_unlocked)
        && (!config.gpu_mining_enabled || gpu_unlocked);
    if ready && !stores.mining.read(|m| m.mining_initiated) {
        tracing::info!("Mining on app start");
        actions.start_mining().await;
    }
}

// App

pub fn critical_problem(stores: &Stores, problem: CriticalProblem) {
    stores.app.update(|a| a.critical_problem = Some(problem));
}

pub fn set_critical_error(stores: &Stores, problem: CriticalProblem) {
    let error = CriticalError {
        title: problem.title.unwrap_or_default(),
        description: problem.description.unwrap_or_default(),
    };
    tracing::error!("Critical error: {}", error.title);
    stores.app.update(|a| a.critical_error = Some(error));
}

pub fn missing_applications(stores: &Stores, applications: Vec<String>) {
    stores.app.update(|a| a.missing_applications = applications);
}

pub fn release_notes(stores: &Stores, notes: ReleaseNotes) {
    stores.app.update(|a| a.release_notes = Some(notes));
}

pub fn ask_for_restart(stores: &Stores) {
    stores.app.update(|a| a.show_restart_dialog = true);
}

pub fn exchange_miner_modal(stores: &Stores) {
    stores.app.update(|a| a.show_exchange_miner_modal = true);
}

pub fn stage_security_modal(stores: &Stores) {
    stores.app.update(|a| a.show_stage_security_modal = true);
}

pub fn tapplets_csp(stores: &Stores, csp: String) {
    stores.app.update(|a| a.tapplets_csp = Some(csp));
}
