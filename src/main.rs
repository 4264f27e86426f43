mod api;
mod blockchain;
mod p2p;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use std::env;

use api::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8000);
    // The address peers should reach this node at; used when registering
    // with a seed node.
    let node_address =
        env::var("NODE_ADDRESS").unwrap_or_else(|_| format!("http://{host}:{port}"));

    println!("⛓️ Starting ledger node at http://{host}:{port}");

    let state = web::Data::new(AppState::new(node_address));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
