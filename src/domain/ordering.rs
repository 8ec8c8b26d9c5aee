//! Stable event ordering for deterministic projection.

use crate::domain::EventEnvelope;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of an event in its chain: block first, then log index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPosition {
    pub block_number: u64,
    pub log_index: u64,
}

impl EventPosition {
    pub fn new(block_number: u64, log_index: u64) -> Self {
        Self {
            block_number,
            log_index,
        }
    }

    pub fn of(envelope: &EventEnvelope) -> Self {
        Self::new(envelope.block_number, envelope.log_index)
    }

    /// True if `self` may be processed after `cursor`.
    pub fn follows(&self, cursor: Option<EventPosition>) -> bool {
        cursor.map_or(true, |cursor| *self > cursor)
    }
}

impl fmt::Display for EventPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block_number, self.log_index)
    }
}
