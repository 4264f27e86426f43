use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::models::{AppState, ConsensusResponse, PeersResponse, RegisterRequest, RegisterResponse};
use crate::blockchain::Block;
use crate::p2p;

/// Register a calling node as a peer. Responds with this node's full chain
/// dump and peer set so the caller can bootstrap from it.
#[post("/peers/register/")]
pub async fn register_peer(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> impl Responder {
    {
        let mut peers = state.peers.lock().expect("mutex poisoned");
        if let Err(msg) = p2p::register_peer(&mut peers, &body.node_address) {
            return HttpResponse::BadRequest().body(msg);
        }
    }
    info!("registered peer {}", body.node_address.trim());

    let (length, chain) = {
        let node = state.node.lock().expect("mutex poisoned");
        (node.len(), node.chain.clone())
    };
    let peers = {
        let peers = state.peers.lock().expect("mutex poisoned");
        peers.clone()
    };
    HttpResponse::Ok().json(RegisterResponse {
        length,
        chain,
        peers,
    })
}

/// Join an existing network through a seed node: register there, rebuild
/// the local chain from its dump (all-or-nothing) and merge its peer set.
#[post("/peers/join/")]
pub async fn join_network(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> impl Responder {
    let seed = body.node_address.trim().to_string();
    if seed.is_empty() {
        return HttpResponse::BadRequest().body("missing address");
    }

    match p2p::join_network(&state.http, &seed, &state.node_address).await {
        Ok((rebuilt, fetched_peers)) => {
            {
                let mut node = state.node.lock().expect("mutex poisoned");
                node.replace_chain(rebuilt.chain);
            }
            {
                let mut peers = state.peers.lock().expect("mutex poisoned");
                peers.insert(seed.clone());
                peers.extend(
                    fetched_peers
                        .into_iter()
                        .filter(|p| !p.trim().is_empty() && *p != state.node_address),
                );
            }
            info!("joined network via {seed}");
            HttpResponse::Ok().body("registration successful")
        }
        Err(msg) => {
            warn!("join via {seed} failed: {msg}");
            HttpResponse::BadRequest().body(msg)
        }
    }
}

/// List known peers (sorted for a stable response).
#[get("/peers/")]
pub async fn list_peers(state: web::Data<AppState>) -> impl Responder {
    let mut peers: Vec<String> = {
        let peers = state.peers.lock().expect("mutex poisoned");
        peers.iter().cloned().collect()
    };
    peers.sort();
    HttpResponse::Ok().json(PeersResponse {
        size: peers.len(),
        peers,
    })
}

/// Receive a block announced by a peer. The embedded hash is the claimed
/// proof; the block goes through the same admission gate as a local mine.
#[post("/blocks/")]
pub async fn receive_block(state: web::Data<AppState>, body: web::Json<Block>) -> impl Responder {
    let block = body.into_inner();
    let proof = block.hash.clone();
    let index = block.index;

    let added = {
        let mut node = state.node.lock().expect("mutex poisoned");
        node.append_block(block, proof)
    };
    if !added {
        warn!("announced block #{index} discarded");
        return HttpResponse::BadRequest().body("discarded: invalid proof or linkage");
    }
    info!("announced block #{index} added to the chain");
    HttpResponse::Created().body("block added to the chain")
}

/// Run a consensus pass over all known peers on demand.
#[post("/consensus/")]
pub async fn run_consensus(state: web::Data<AppState>) -> impl Responder {
    let replaced = p2p::consensus::resolve(&state).await;
    let length = {
        let node = state.node.lock().expect("mutex poisoned");
        node.len()
    };
    HttpResponse::Ok().json(ConsensusResponse { replaced, length })
}
