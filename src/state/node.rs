//! Base node runtime state

use serde::Serialize;

use crate::config::NodeType;
use crate::events::{BackgroundNodeSync, ConnectionStatus, NetworkStatus, NodeIdentity};

/// Node-related runtime state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeState {
    pub block_height: u64,
    pub block_time: u64,
    pub is_synced: bool,
    pub num_connections: u32,
    pub connected_peers: Vec<String>,
    pub node_type: NodeType,
    pub node_identity: Option<NodeIdentity>,
    pub node_connection_address: Option<String>,
    pub connection_status: ConnectionStatus,
    pub stuck_on_orphan_chain: bool,
    pub background_sync: Option<BackgroundNodeSync>,
    pub network_status: Option<NetworkStatus>,
    pub tor_entry_guards: Vec<String>,
}
