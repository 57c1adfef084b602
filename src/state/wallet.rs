//! Wallet runtime state

use serde::Serialize;

use crate::events::{AddressType, Transaction, WalletBalance, WalletScanningProgress};

/// Number of recent transactions kept for display
pub const RECENT_TRANSACTIONS: usize = 20;

/// Wallet-related runtime state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WalletState {
    pub address_base58: String,
    pub address_emoji: String,
    pub is_address_generated: bool,
    pub selected_address_type: AddressType,
    pub balance: Option<WalletBalance>,
    /// Newest first
    pub transactions: Vec<Transaction>,
    pub pending_transactions: Vec<Transaction>,
    pub scanning: WalletScanningProgress,
    pub is_pin_locked: bool,
    pub is_seed_backed_up: bool,
}

impl WalletState {
    /// Put a transaction at the head of the list, replacing an older copy
    pub fn push_transaction(&mut self, tx: Transaction) {
        self.transactions.retain(|t| t.tx_id != tx.tx_id);
        self.transactions.insert(0, tx);
        self.transactions.truncate(RECENT_TRANSACTIONS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: &str) -> Transaction {
        Transaction {
            tx_id: id.to_string(),
            amount: 1,
            mined_in_block_height: None,
            is_coinbase: true,
        }
    }

    #[test]
    fn test_push_transaction_dedups_and_caps() {
        let mut wallet = WalletState::default();
        for i in 0..(RECENT_TRANSACTIONS + 5) {
            wallet.push_transaction(tx(&i.to_string()));
        }
        wallet.push_transaction(tx("3"));
        assert_eq!(wallet.transactions.len(), RECENT_TRANSACTIONS);
        assert_eq!(wallet.transactions[0].tx_id, "3");
        assert_eq!(
            wallet.transactions.iter().filter(|t| t.tx_id == "3").count(),
            1
        );
    }
}
