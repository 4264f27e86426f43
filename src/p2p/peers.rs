use std::collections::HashSet;

use log::warn;
use reqwest::Client;

use crate::api::models::{RegisterRequest, RegisterResponse};
use crate::blockchain::{Block, Blockchain, POW_DIFFICULTY};

/// Add a peer address to the registry. Re-registering a known peer is a
/// no-op, not an error.
pub fn register_peer(peers: &mut HashSet<String>, address: &str) -> Result<(), &'static str> {
    let address = address.trim();
    if address.is_empty() {
        return Err("missing address");
    }
    peers.insert(address.to_string());
    Ok(())
}

/// Register with a seed node and pull its chain dump and peer set. The
/// chain is rebuilt through the admission gate (`Blockchain::from_dump`),
/// so a tampered dump fails the whole join and installs nothing.
pub async fn join_network(
    client: &Client,
    seed: &str,
    self_address: &str,
) -> Result<(Blockchain, HashSet<String>), String> {
    let url = format!("{}/api/v1/peers/register/", seed.trim_end_matches('/'));
    let body = RegisterRequest {
        node_address: self_address.to_string(),
    };

    let response = client
        .post(&url)
        .json(&body)
        .send()
        .await
        .map_err(|err| format!("seed unreachable: {err}"))?;
    if !response.status().is_success() {
        return Err(format!("seed rejected registration: {}", response.status()));
    }
    let dump: RegisterResponse = response
        .json()
        .await
        .map_err(|err| format!("malformed register response: {err}"))?;

    let rebuilt = Blockchain::from_dump(dump.chain, POW_DIFFICULTY)?;
    Ok((rebuilt, dump.peers))
}

/// Best-effort fan-out of a freshly mined block to every known peer's
/// block-submission endpoint. A peer that rejects or is unreachable only
/// means its copy stays behind until the next consensus pass.
pub async fn announce_block(client: &Client, peers: &HashSet<String>, block: &Block) {
    for peer in peers {
        let url = format!("{}/api/v1/blocks/", peer.trim_end_matches('/'));
        match client.post(&url).json(block).send().await {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => warn!(
                "peer {peer} discarded announced block #{}: {}",
                block.index,
                response.status()
            ),
            Err(err) => warn!("failed to announce block #{} to {peer}: {err}", block.index),
        }
    }
}
