//! Deterministic keys for every stored aggregate.
//!
//! Keys are plain strings so that they can be used verbatim as primary keys;
//! recomputing a key from the same inputs always yields the same bytes.

use super::primitives::hex_address;
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_key {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an already-derived key, e.g. one read back from storage.
            pub fn from_raw(raw: impl Into<String>) -> Self {
                $name(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_key!(LotKey);
string_key!(BidKey);
string_key!(DerivativeLotKey);

impl LotKey {
    /// `chain-0xauctionhouse-lotId`. The chain prefix keeps deployments on
    /// different chains apart when they share a store.
    pub fn derive(chain: &str, auction_house: &Address, lot_id: u64) -> Self {
        LotKey(format!("{}-{}-{}", chain, hex_address(auction_house), lot_id))
    }
}

impl BidKey {
    /// `lotKey-bidId`.
    pub fn derive(lot: &LotKey, bid_id: u64) -> Self {
        BidKey(format!("{}-{}", lot.as_str(), bid_id))
    }
}

impl DerivativeLotKey {
    /// `chain-0xmodule-tokenId`; the token id is the decimal form.
    pub fn derive(chain: &str, module: &Address, token_id: U256) -> Self {
        DerivativeLotKey(format!("{}-{}-{}", chain, hex_address(module), token_id))
    }
}

/// Key of an append-only record: `txHash-logIndex[-lotId[-bidId]]`.
pub fn event_record_key(
    transaction_hash: &B256,
    log_index: u64,
    lot_id: Option<u64>,
    bid_id: Option<u64>,
) -> String {
    let mut key = format!("{:#x}-{}", transaction_hash, log_index);
    if let Some(lot_id) = lot_id {
        key.push_str(&format!("-{}", lot_id));
        if let Some(bid_id) = bid_id {
            key.push_str(&format!("-{}", bid_id));
        }
    }
    key
}
