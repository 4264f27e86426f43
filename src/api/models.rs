use std::collections::HashSet;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::blockchain::{Block, Blockchain, POW_DIFFICULTY, Record};

/// Shared application state: one ledger engine and one peer registry per
/// node, plus the node's own externally reachable address and the HTTP
/// client used for peer calls. Locks are held for engine mutation only;
/// peer I/O always runs lock-free on snapshots.
pub struct AppState {
    pub node: Mutex<Blockchain>,
    pub peers: Mutex<HashSet<String>>,
    pub node_address: String,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(node_address: String) -> Self {
        Self {
            node: Mutex::new(Blockchain::new(POW_DIFFICULTY)),
            peers: Mutex::new(HashSet::new()),
            node_address,
            http: reqwest::Client::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize, Deserialize)]
pub struct ChainResponse {
    pub length: usize,
    pub chain: Vec<Block>,
}

#[derive(Serialize, Deserialize)]
pub struct MineResponse {
    pub mined: bool,
    pub mined_index: Option<u64>,
    pub hash: Option<String>,
    pub nonce: Option<u64>,
}

/* ---------- Record API Models ---------- */

#[derive(Serialize, Deserialize)]
pub struct PendingResponse {
    pub size: usize,
    pub records: Vec<Record>,
}

/* ---------- Peer API Models ---------- */

#[derive(Serialize, Deserialize)]
pub struct RegisterRequest {
    pub node_address: String,
}

/// Register response doubles as the join bootstrap: the full chain dump
/// plus the peer set the caller should merge.
#[derive(Serialize, Deserialize)]
pub struct RegisterResponse {
    pub length: usize,
    pub chain: Vec<Block>,
    pub peers: HashSet<String>,
}

#[derive(Serialize, Deserialize)]
pub struct PeersResponse {
    pub size: usize,
    pub peers: Vec<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ConsensusResponse {
    pub replaced: bool,
    pub length: usize,
}
