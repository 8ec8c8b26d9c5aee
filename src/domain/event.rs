//! Inbound event envelope, typed event parameters and the audit record.

use super::identity::{event_record_key, BidKey, LotKey};
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// One decoded log as delivered by the upstream feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    pub emitting_address: Address,
    pub block_number: u64,
    pub block_timestamp: u64,
    pub transaction_hash: B256,
    pub log_index: u64,
    pub event: AuctionEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionCreated {
    pub lot_id: u64,
    #[serde(default)]
    pub info_hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotEvent {
    pub lot_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Curated {
    pub lot_id: u64,
    pub curator: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidPlaced {
    pub lot_id: u64,
    pub bid_id: u64,
    pub bidder: Address,
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidDecrypted {
    pub lot_id: u64,
    pub bid_id: u64,
    pub amount_in: U256,
    pub amount_out: U256,
}

/// Refund and claim share one parameter shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidAction {
    pub lot_id: u64,
    pub bid_id: u64,
    pub bidder: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redeemed {
    pub user: Address,
    pub token_id: U256,
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionRegistered {
    pub auction_house: Address,
    pub lot_id: u64,
    pub info_hash: String,
}

/// Every event class the ledger consumes.
///
/// Auction-house events carry the lot id; `BidDecrypted` is emitted by the
/// auction module, `Redeemed` by the derivative module and
/// `AuctionRegistered` by the metadata registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "eventName", content = "params")]
pub enum AuctionEvent {
    AuctionCreated(AuctionCreated),
    AuctionCancelled(LotEvent),
    Curated(Curated),
    Bid(BidPlaced),
    BidDecrypted(BidDecrypted),
    RefundBid(BidAction),
    ClaimBid(BidAction),
    Settle(LotEvent),
    Abort(LotEvent),
    Redeemed(Redeemed),
    AuctionRegistered(AuctionRegistered),
}

impl AuctionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AuctionEvent::AuctionCreated(_) => "AuctionCreated",
            AuctionEvent::AuctionCancelled(_) => "AuctionCancelled",
            AuctionEvent::Curated(_) => "Curated",
            AuctionEvent::Bid(_) => "Bid",
            AuctionEvent::BidDecrypted(_) => "BidDecrypted",
            AuctionEvent::RefundBid(_) => "RefundBid",
            AuctionEvent::ClaimBid(_) => "ClaimBid",
            AuctionEvent::Settle(_) => "Settle",
            AuctionEvent::Abort(_) => "Abort",
            AuctionEvent::Redeemed(_) => "Redeemed",
            AuctionEvent::AuctionRegistered(_) => "AuctionRegistered",
        }
    }

    pub fn lot_id(&self) -> Option<u64> {
        match self {
            AuctionEvent::AuctionCreated(e) => Some(e.lot_id),
            AuctionEvent::AuctionCancelled(e) | AuctionEvent::Settle(e) | AuctionEvent::Abort(e) => {
                Some(e.lot_id)
            }
            AuctionEvent::Curated(e) => Some(e.lot_id),
            AuctionEvent::Bid(e) => Some(e.lot_id),
            AuctionEvent::BidDecrypted(e) => Some(e.lot_id),
            AuctionEvent::RefundBid(e) | AuctionEvent::ClaimBid(e) => Some(e.lot_id),
            AuctionEvent::AuctionRegistered(e) => Some(e.lot_id),
            AuctionEvent::Redeemed(_) => None,
        }
    }

    pub fn bid_id(&self) -> Option<u64> {
        match self {
            AuctionEvent::Bid(e) => Some(e.bid_id),
            AuctionEvent::BidDecrypted(e) => Some(e.bid_id),
            AuctionEvent::RefundBid(e) | AuctionEvent::ClaimBid(e) => Some(e.bid_id),
            _ => None,
        }
    }

    /// Typed parameters as JSON, for the audit record.
    pub fn params_json(&self) -> serde_json::Value {
        serde_json::to_value(self)
            .ok()
            .and_then(|mut v| v.get_mut("params").map(serde_json::Value::take))
            .unwrap_or(serde_json::Value::Null)
    }
}

/// Immutable audit record, one per accepted lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    pub event_name: String,
    pub chain: String,
    pub emitting_address: Address,
    pub block_number: u64,
    pub block_timestamp: u64,
    pub transaction_hash: B256,
    pub log_index: u64,
    pub lot: Option<LotKey>,
    pub bid: Option<BidKey>,
    pub params: serde_json::Value,
}

impl EventRecord {
    pub fn new(
        chain: &str,
        envelope: &EventEnvelope,
        lot: Option<LotKey>,
        bid: Option<BidKey>,
    ) -> Self {
        Self {
            id: event_record_key(
                &envelope.transaction_hash,
                envelope.log_index,
                envelope.event.lot_id(),
                envelope.event.bid_id(),
            ),
            event_name: envelope.event.name().to_string(),
            chain: chain.to_string(),
            emitting_address: envelope.emitting_address,
            block_number: envelope.block_number,
            block_timestamp: envelope.block_timestamp,
            transaction_hash: envelope.transaction_hash,
            log_index: envelope.log_index,
            lot,
            bid,
            params: envelope.event.params_json(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_json_shape() {
        let json = serde_json::json!({
            "emittingAddress": "0x0101010101010101010101010101010101010101",
            "blockNumber": 100,
            "blockTimestamp": 1715274000,
            "transactionHash": "0x0202020202020202020202020202020202020202020202020202020202020202",
            "logIndex": 3,
            "event": {
                "eventName": "Bid",
                "params": {
                    "lotId": 1,
                    "bidId": 2,
                    "bidder": "0x0303030303030303030303030303030303030303",
                    "amount": "0x64"
                }
            }
        });
        let envelope: EventEnvelope = serde_json::from_value(json).unwrap();
        assert_eq!(envelope.event.name(), "Bid");
        assert_eq!(envelope.event.lot_id(), Some(1));
        assert_eq!(envelope.event.bid_id(), Some(2));
        match envelope.event {
            AuctionEvent::Bid(bid) => assert_eq!(bid.amount, U256::from(100u64)),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_event_record_key_and_params() {
        let envelope = EventEnvelope {
            emitting_address: Address::repeat_byte(1),
            block_number: 10,
            block_timestamp: 1000,
            transaction_hash: B256::repeat_byte(2),
            log_index: 7,
            event: AuctionEvent::Settle(LotEvent { lot_id: 5 }),
        };
        let record = EventRecord::new("mainnet", &envelope, None, None);
        assert!(record.id.ends_with("-7-5"));
        assert_eq!(record.event_name, "Settle");
        assert_eq!(record.params, serde_json::json!({ "lotId": 5 }));
    }
}
