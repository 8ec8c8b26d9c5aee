use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use super::AppState;

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Ready while the store answers and ingestion has not halted.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if let Err(err) = sqlx::query("SELECT 1").execute(state.repo.pool()).await {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "unavailable", "error": err.to_string()})),
        );
    }

    let ingestor = state.ingestor.lock().await;
    match ingestor.halted() {
        Some(reason) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "halted", "reason": reason})),
        ),
        None => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "chain": ingestor.chain(),
                "cursor": ingestor.cursor(),
            })),
        ),
    }
}
