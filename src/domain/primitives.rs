//! Domain primitives: block context, provenance, address formatting.

use alloy_primitives::{Address, B256};
use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// The block every authoritative read is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockRef(pub u64);

impl BlockRef {
    pub fn new(number: u64) -> Self {
        BlockRef(number)
    }

    pub fn number(&self) -> u64 {
        self.0
    }
}

/// Where and when an aggregate was created or last touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub block_number: u64,
    pub block_timestamp: u64,
    /// UTC calendar date of `block_timestamp`, `YYYY-MM-DD`.
    pub date: String,
    pub transaction_hash: B256,
}

impl Provenance {
    pub fn new(block_number: u64, block_timestamp: u64, transaction_hash: B256) -> Self {
        Self {
            block_number,
            block_timestamp,
            date: block_date(block_timestamp),
            transaction_hash,
        }
    }
}

/// Lowercase `0x`-prefixed hex form of an address, used inside keys.
pub fn hex_address(address: &Address) -> String {
    format!("{address:#x}")
}

/// `None` for the zero address, which contracts use as "unset".
pub fn non_zero(address: Address) -> Option<Address> {
    if address.is_zero() {
        None
    } else {
        Some(address)
    }
}

/// UTC date of a unix timestamp in seconds.
pub fn block_date(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
