mod chain;
mod health;
pub mod models;
mod peers;
mod records;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(chain::get_chain)
            .service(chain::mine_block)
            .service(records::post_record)
            .service(records::get_pending)
            .service(peers::register_peer)
            .service(peers::join_network)
            .service(peers::list_peers)
            .service(peers::receive_block)
            .service(peers::run_consensus),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test, web};
    use serde_json::json;

    use super::models::{
        AppState, ChainResponse, MineResponse, PeersResponse, PendingResponse, RegisterResponse,
    };
    use super::init_routes;
    use crate::blockchain::Block;

    macro_rules! node {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(AppState::default()))
                    .configure(init_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn submit_records_and_mine_end_to_end() {
        let app = node!();

        for body in [
            json!({"author": "alice", "content": "first entry"}),
            json!({"author": "bob", "content": "second entry"}),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/v1/records/")
                .set_json(&body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 201);
        }

        let req = test::TestRequest::post().uri("/api/v1/mine/").to_request();
        let mined: MineResponse = test::call_and_read_body_json(&app, req).await;
        assert!(mined.mined);
        assert_eq!(mined.mined_index, Some(1));
        assert!(mined.hash.expect("hash").starts_with("00"));

        let req = test::TestRequest::get()
            .uri("/api/v1/records/pending/")
            .to_request();
        let pending: PendingResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(pending.size, 0);

        let req = test::TestRequest::get().uri("/api/v1/chain/").to_request();
        let dump: ChainResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(dump.length, 2);
        assert_eq!(dump.chain[1].records.len(), 2);
        // Submitted records are stamped with a server-side timestamp.
        assert!(dump.chain[1].records[0].get("timestamp").is_some());
    }

    #[actix_web::test]
    async fn mine_with_nothing_pending_is_not_an_error() {
        let app = node!();

        let req = test::TestRequest::post().uri("/api/v1/mine/").to_request();
        let mined: MineResponse = test::call_and_read_body_json(&app, req).await;
        assert!(!mined.mined);
        assert_eq!(mined.mined_index, None);

        let req = test::TestRequest::get().uri("/api/v1/chain/").to_request();
        let dump: ChainResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(dump.length, 1);
    }

    #[actix_web::test]
    async fn record_shape_is_validated_at_the_boundary() {
        let app = node!();

        for body in [
            json!({"author": "alice"}),
            json!({"content": "no author"}),
            json!({"author": "", "content": "blank author"}),
            json!(["not", "an", "object"]),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/v1/records/")
                .set_json(&body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 400);
        }
    }

    #[actix_web::test]
    async fn peer_registration_validates_and_is_idempotent() {
        let app = node!();

        let req = test::TestRequest::post()
            .uri("/api/v1/peers/register/")
            .set_json(json!({"node_address": ""}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri("/api/v1/peers/register/")
                .set_json(json!({"node_address": "http://127.0.0.1:8001"}))
                .to_request();
            let dump: RegisterResponse = test::call_and_read_body_json(&app, req).await;
            assert_eq!(dump.length, 1);
            assert!(dump.peers.contains("http://127.0.0.1:8001"));
        }

        let req = test::TestRequest::get().uri("/api/v1/peers/").to_request();
        let peers: PeersResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(peers.size, 1);
    }

    #[actix_web::test]
    async fn join_requires_a_seed_address() {
        let app = node!();

        let req = test::TestRequest::post()
            .uri("/api/v1/peers/join/")
            .set_json(json!({"node_address": "  "}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn announced_block_is_reverified_before_acceptance() {
        let app = node!();

        let req = test::TestRequest::get().uri("/api/v1/chain/").to_request();
        let dump: ChainResponse = test::call_and_read_body_json(&app, req).await;
        let head_hash = dump.chain[0].hash.clone();

        // A properly mined next block is accepted.
        let mut block = Block::candidate(
            1,
            head_hash.clone(),
            vec![json!({"author": "peer", "content": "announced"})],
        );
        block.hash = block.find_proof(2);
        let req = test::TestRequest::post()
            .uri("/api/v1/blocks/")
            .set_json(&block)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);

        // Replaying it fails linkage against the new head.
        let req = test::TestRequest::post()
            .uri("/api/v1/blocks/")
            .set_json(&block)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body = test::read_body(resp).await;
        assert_eq!(body, "discarded: invalid proof or linkage");

        // A block with a forged hash is discarded.
        let mut forged = Block::candidate(
            2,
            block.hash.clone(),
            vec![json!({"author": "eve", "content": "forged"})],
        );
        forged.hash = "00".repeat(32);
        let req = test::TestRequest::post()
            .uri("/api/v1/blocks/")
            .set_json(&forged)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let req = test::TestRequest::get().uri("/api/v1/chain/").to_request();
        let dump: ChainResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(dump.length, 2);
    }

    #[actix_web::test]
    async fn consensus_with_no_peers_reports_no_change() {
        let app = node!();

        let req = test::TestRequest::post()
            .uri("/api/v1/consensus/")
            .to_request();
        let resp: super::models::ConsensusResponse =
            test::call_and_read_body_json(&app, req).await;
        assert!(!resp.replaced);
        assert_eq!(resp.length, 1);
    }
}
