//! Application view state
//!
//! This module contains the grouped state structs the views read from.
//! Each struct lives in its own [`Store`] so writers only touch what they own.

mod app;
mod errors;
mod mining;
mod node;
mod setup;
mod wallet;

use serde::Serialize;

pub use app::{AppState, CriticalError};
pub use errors::ErrorState;
pub use mining::MiningState;
pub use node::NodeState;
pub use setup::SetupState;
pub use wallet::{RECENT_TRANSACTIONS, WalletState};

use crate::config::{CoreConfig, InMemoryConfig, MiningConfig, UiConfig, WalletConfig};
use crate::store::Store;

/// Every store the bridge reads and writes, created once at startup
#[derive(Clone, Default)]
pub struct Stores {
    pub core_config: Store<CoreConfig>,
    pub wallet_config: Store<WalletConfig>,
    pub mining_config: Store<MiningConfig>,
    pub ui_config: Store<UiConfig>,
    pub in_memory_config: Store<InMemoryConfig>,
    pub mining: Store<MiningState>,
    pub node: Store<NodeState>,
    pub wallet: Store<WalletState>,
    pub setup: Store<SetupState>,
    pub app: Store<AppState>,
    pub errors: Store<ErrorState>,
}

/// Point-in-time copy of every store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoresSnapshot {
    pub core_config: CoreConfig,
    pub wallet_config: WalletConfig,
    pub mining_config: MiningConfig,
    pub ui_config: UiConfig,
    pub in_memory_config: InMemoryConfig,
    pub mining: MiningState,
    pub node: NodeState,
    pub wallet: WalletState,
    pub setup: SetupState,
    pub app: AppState,
    pub errors: ErrorState,
}

impl Stores {
    pub fn snapshot(&self) -> StoresSnapshot {
        StoresSnapshot {
            core_config: self.core_config.get(),
            wallet_config: self.wallet_config.get(),
            mining_config: self.mining_config.get(),
            ui_config: self.ui_config.get(),
            in_memory_config: self.in_memory_config.get(),
            mining: self.mining.get(),
            node: self.node.get(),
            wallet: self.wallet.get(),
            setup: self.setup.get(),
            app: self.app.get(),
            errors: self.errors.get(),
        }
    }

    /// Queue a user-visible error
    pub fn raise_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.errors.update(|e| e.raise(message));
    }
}
