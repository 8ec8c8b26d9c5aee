use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::AppState;
use crate::domain::{EventEnvelope, EventPosition};
use crate::error::AppError;
use crate::orchestration::IngestOutcome;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    #[serde(flatten)]
    pub outcome: IngestOutcome,
    pub cursor: Option<EventPosition>,
}

/// Feed one decoded event to the ingestor.
pub async fn post_event(
    State(state): State<AppState>,
    Json(envelope): Json<EventEnvelope>,
) -> Result<Json<IngestResponse>, AppError> {
    let mut ingestor = state.ingestor.lock().await;
    let outcome = ingestor.ingest(&envelope).await?;
    Ok(Json(IngestResponse {
        outcome,
        cursor: ingestor.cursor(),
    }))
}
