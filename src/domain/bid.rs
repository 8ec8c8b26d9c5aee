//! Bid aggregate: status and outcome are independent axes.

use super::decimal::Decimal;
use super::identity::{BidKey, LotKey};
use super::primitives::Provenance;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status reported by the auction module.
///
/// `Decrypted` only exists for sealed-bid modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    Submitted,
    Decrypted,
    Claimed,
}

/// Result of a bid once its lot has settled or aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidOutcome {
    Won,
    Lost,
    WonPartialFill,
}

impl fmt::Display for BidOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BidOutcome::Won => write!(f, "won"),
            BidOutcome::Lost => write!(f, "lost"),
            BidOutcome::WonPartialFill => write!(f, "won_partial_fill"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: BidKey,
    pub lot: LotKey,
    pub bid_id: u64,

    pub bidder: Address,
    pub referrer: Option<Address>,

    pub amount_in: Decimal,
    pub raw_amount_in: U256,
    /// Unset for sealed bids until decrypted.
    pub amount_out: Option<Decimal>,
    pub raw_amount_out: Option<U256>,
    pub submitted_price: Option<Decimal>,
    pub raw_submitted_price: Option<U256>,

    pub status: BidStatus,
    pub outcome: Option<BidOutcome>,

    pub settled_amount_in: Option<Decimal>,
    pub settled_amount_in_refunded: Option<Decimal>,
    pub settled_amount_out: Option<Decimal>,

    pub created: Provenance,
    pub last_updated: Provenance,
}

impl Bid {
    /// Both axes terminal: no further event changes this bid.
    pub fn is_final(&self) -> bool {
        self.status == BidStatus::Claimed && self.outcome.is_some()
    }
}
