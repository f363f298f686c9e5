use std::sync::Arc;
use warp::Filter;

use crate::config::Config;
use crate::game_manager::GameManager;
use crate::websocket::ConnectionManager;

pub mod broadcast;
pub mod config;
pub mod game_manager;
pub mod timers;
pub mod websocket;

pub fn create_routes(
    connection_manager: Arc<ConnectionManager>,
    game_manager: Arc<GameManager>,
    config: Config,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let connection_manager_filter = warp::any().map({
        let connection_manager = connection_manager.clone();
        move || connection_manager.clone()
    });

    let game_manager_filter = warp::any().map({
        let game_manager = game_manager.clone();
        move || game_manager.clone()
    });

    let rate_limit = config.rate_limit;

    // WebSocket endpoint
    let websocket = warp::path("ws")
        .and(warp::path::end())
        .and(warp::ws())
        .and(connection_manager_filter)
        .and(game_manager_filter)
        .map(move |ws: warp::ws::Ws, conn_mgr, game_mgr| {
            ws.on_upgrade(move |socket| {
                websocket::handle_connection(socket, conn_mgr, game_mgr, rate_limit)
            })
        });

    // Health check endpoint
    let health = warp::path!("api" / "health")
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({ "status": "ok" })));

    let cors = if config.allowed_origins.is_empty() {
        warp::cors().allow_any_origin()
    } else {
        warp::cors().allow_origins(config.allowed_origins.iter().map(String::as_str))
    }
    .allow_headers(vec!["content-type"])
    .allow_methods(vec!["GET"]);

    websocket
        .or(health)
        .with(cors)
        .with(warp::log("clue_rush"))
}
