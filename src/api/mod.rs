pub mod events;
pub mod health;
pub mod lots;

use crate::db::Repository;
use crate::orchestration::Ingestor;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    /// Events are projected one at a time.
    pub ingestor: Arc<Mutex<Ingestor>>,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, ingestor: Ingestor) -> Self {
        Self {
            repo,
            ingestor: Arc::new(Mutex::new(ingestor)),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/events", post(events::post_event))
        .route("/v1/lots/:id", get(lots::get_lot))
        .route("/v1/lots/:id/bids", get(lots::get_lot_bids))
        .route("/v1/lots/:id/events", get(lots::get_lot_events))
        .route("/v1/bids/:id", get(lots::get_bid))
        .route(
            "/v1/derivatives/:id/redemptions",
            get(lots::get_redemptions),
        )
        .layer(cors)
        .with_state(state)
}
