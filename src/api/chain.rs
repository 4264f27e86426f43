use actix_web::{HttpResponse, Responder, get, post, web};
use log::{debug, info};

use super::models::{AppState, ChainResponse, MineResponse};
use crate::p2p;

/// Get the full chain, every block field included.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let node = state.node.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(ChainResponse {
        length: node.len(),
        chain: node.chain.clone(),
    })
}

/// Mine the pending records into a new block, then announce it to every
/// known peer. An empty mempool is signaled with `mined: false`, not an
/// error.
#[post("/mine/")]
pub async fn mine_block(state: web::Data<AppState>) -> impl Responder {
    // PoW runs under the engine lock; request handling is synchronous per
    // node, so nothing else contends for the chain meanwhile.
    let mined = {
        let mut node = state.node.lock().expect("mutex poisoned");
        node.mine().map(|index| (index, node.last_block().clone()))
    };

    let Some((index, block)) = mined else {
        debug!("POST /mine/ - mempool empty, nothing to mine");
        return HttpResponse::Ok().json(MineResponse {
            mined: false,
            mined_index: None,
            hash: None,
            nonce: None,
        });
    };
    info!(
        "MINER - sealed block #{index} (hash={}, nonce={})",
        block.hash, block.nonce
    );

    // Fan the block out with no lock held. Best-effort: peers that reject
    // or are unreachable catch up on their next consensus pass.
    let peers = {
        let peers = state.peers.lock().expect("mutex poisoned");
        peers.clone()
    };
    p2p::announce_block(&state.http, &peers, &block).await;

    HttpResponse::Ok().json(MineResponse {
        mined: true,
        mined_index: Some(index),
        hash: Some(block.hash),
        nonce: Some(block.nonce),
    })
}
