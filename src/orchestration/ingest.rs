//! Ordered, atomic ingestion of projected events for one chain.

use crate::db::Repository;
use crate::domain::{EventEnvelope, EventPosition};
use crate::engine::{ProjectionError, ProjectionOutcome, Projector, Severity};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

/// Sequential ingestion for one chain.
///
/// Events must arrive in strictly increasing `(block, log index)` order. A
/// fatal projection error fails that event only and leaves the cursor in
/// place; a contract violation halts ingestion until restart.
#[derive(Debug)]
pub struct Ingestor {
    projector: Projector,
    repo: Repository,
    cursor: Option<EventPosition>,
    halted: Option<String>,
}

impl Ingestor {
    /// Create an ingestor resuming from the persisted cursor.
    pub async fn open(projector: Projector, repo: Repository) -> Result<Self, IngestionError> {
        let cursor = repo.get_cursor(projector.chain()).await?;
        match cursor {
            Some(cursor) => info!(chain = projector.chain(), cursor = %cursor, "Resuming ingestion"),
            None => info!(chain = projector.chain(), "Starting ingestion from genesis"),
        }
        Ok(Self {
            projector,
            repo,
            cursor,
            halted: None,
        })
    }

    pub fn chain(&self) -> &str {
        self.projector.chain()
    }

    pub fn cursor(&self) -> Option<EventPosition> {
        self.cursor
    }

    pub fn halted(&self) -> Option<&str> {
        self.halted.as_deref()
    }

    /// Project one event and commit its writes together with the cursor.
    pub async fn ingest(&mut self, envelope: &EventEnvelope) -> Result<IngestOutcome, IngestionError> {
        if let Some(reason) = &self.halted {
            return Err(IngestionError::Halted(reason.clone()));
        }

        let position = EventPosition::of(envelope);
        if let Some(cursor) = self.cursor {
            if !position.follows(Some(cursor)) {
                return Err(IngestionError::OutOfOrder { position, cursor });
            }
        }

        let projection = match self.projector.project(envelope).await {
            Ok(projection) => projection,
            Err(err) => {
                if err.severity() == Severity::ContractViolation {
                    error!(
                        event = envelope.event.name(),
                        position = %position,
                        error = %err,
                        "Contract violation, halting ingestion"
                    );
                    self.halted = Some(format!("{} at {}", err, position));
                } else {
                    error!(
                        event = envelope.event.name(),
                        position = %position,
                        error = %err,
                        "Event failed"
                    );
                }
                return Err(IngestionError::Projection(err));
            }
        };

        self.repo
            .apply_batch(self.projector.chain(), position, &projection.batch)
            .await?;
        self.cursor = Some(position);
        self.projector.tokens().admit(&projection.batch.tokens);

        Ok(match projection.outcome {
            ProjectionOutcome::Applied => IngestOutcome::Applied { position },
            ProjectionOutcome::Skipped { reason } => IngestOutcome::Skipped { position, reason },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IngestOutcome {
    Applied {
        position: EventPosition,
    },
    Skipped {
        position: EventPosition,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("event at {position} does not follow cursor {cursor}")]
    OutOfOrder {
        position: EventPosition,
        cursor: EventPosition,
    },
    #[error("ingestion halted: {0}")]
    Halted(String),
    #[error(transparent)]
    Projection(#[from] ProjectionError),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}
