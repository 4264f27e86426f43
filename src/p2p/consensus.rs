use log::{info, warn};
use reqwest::Client;

use crate::api::models::{AppState, ChainResponse};
use crate::blockchain::{Block, Blockchain};

/// Pick the best replacement among already-fetched peer chains under the
/// longest-valid-chain rule: a candidate wins only if its reported length
/// is strictly greater than the best seen so far (seeded with the local
/// length) AND it passes full validity re-verification. Returns `None`
/// when the local chain stays the best.
pub fn select_longest_valid(
    local: &Blockchain,
    candidates: Vec<(usize, Vec<Block>)>,
) -> Option<Vec<Block>> {
    let mut best: Option<Vec<Block>> = None;
    let mut best_len = local.len();

    for (length, chain) in candidates {
        if length > best_len && local.check_chain_validity(&chain) {
            best_len = length;
            best = Some(chain);
        }
    }
    best
}

/// Poll every known peer for its chain and adopt the longest valid remote
/// one, if any. Peer failures contribute nothing and never abort the scan.
/// Returns whether the local chain was replaced.
pub async fn resolve(state: &AppState) -> bool {
    let peers: Vec<String> = {
        let peers = state.peers.lock().expect("mutex poisoned");
        peers.iter().cloned().collect()
    };

    // All network I/O happens with no lock held.
    let mut candidates = Vec::with_capacity(peers.len());
    for peer in &peers {
        match fetch_chain(&state.http, peer).await {
            Ok(dump) => candidates.push((dump.length, dump.chain)),
            Err(err) => warn!("consensus: skipping peer {peer}: {err}"),
        }
    }

    let mut node = state.node.lock().expect("mutex poisoned");
    match select_longest_valid(&node, candidates) {
        Some(chain) => {
            info!(
                "consensus: adopting remote chain of length {} (was {})",
                chain.len(),
                node.len()
            );
            node.replace_chain(chain);
            true
        }
        None => false,
    }
}

async fn fetch_chain(client: &Client, peer: &str) -> Result<ChainResponse, String> {
    let url = format!("{}/api/v1/chain/", peer.trim_end_matches('/'));
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|err| err.to_string())?;
    // Typed decode: a chain is never handled as raw JSON.
    response
        .json::<ChainResponse>()
        .await
        .map_err(|err| err.to_string())
}
