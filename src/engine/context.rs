use crate::domain::{BlockRef, EventEnvelope, Provenance};
use alloy_primitives::Address;

/// Block context of the event being projected. Every authoritative read is
/// anchored at `at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    pub chain: String,
    pub at: BlockRef,
    pub provenance: Provenance,
    pub emitter: Address,
    pub log_index: u64,
}

impl EventContext {
    pub fn new(chain: &str, envelope: &EventEnvelope) -> Self {
        Self {
            chain: chain.to_string(),
            at: BlockRef::new(envelope.block_number),
            provenance: Provenance::new(
                envelope.block_number,
                envelope.block_timestamp,
                envelope.transaction_hash,
            ),
            emitter: envelope.emitting_address,
            log_index: envelope.log_index,
        }
    }
}
