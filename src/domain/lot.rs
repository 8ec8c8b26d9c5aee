//! Auction lot aggregate and the token records it references.

use super::decimal::Decimal;
use super::identity::{DerivativeLotKey, LotKey};
use super::module::ModuleKind;
use super::primitives::{hex_address, Provenance};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// ERC20 metadata, resolved once per address and treated as immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: String,
    pub chain: String,
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: Decimal,
}

impl Token {
    pub fn key(chain: &str, address: &Address) -> String {
        format!("{}-{}", chain, hex_address(address))
    }
}

/// One auction instance on one auction house.
///
/// Accounting fields (`capacity`, `sold`, `purchased`, fees, curator approval)
/// are always overwritten from an authoritative read, never adjusted locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionLot {
    pub id: LotKey,
    pub chain: String,
    pub auction_house: Address,
    pub lot_id: u64,

    pub base_token: Address,
    pub quote_token: Address,
    pub base_decimals: u8,
    pub quote_decimals: u8,

    pub start: u64,
    pub conclusion: u64,

    pub capacity_in_quote: bool,
    pub capacity_initial: Decimal,
    pub capacity: Decimal,
    pub sold: Decimal,
    pub purchased: Decimal,

    pub seller: Address,
    pub auction_module: Address,
    /// Keycode string of the auction module, e.g. `EMPA`.
    pub auction_type: String,
    /// Variant tag chosen once at creation; all later dispatch uses it.
    pub module: ModuleKind,
    pub derivative_type: Option<String>,
    pub derivative_lot: Option<DerivativeLotKey>,
    pub wrap_derivative: bool,

    pub curator: Option<Address>,
    pub curator_approved: bool,
    pub curator_fee: Decimal,
    pub protocol_fee: Decimal,
    pub referrer_fee: Decimal,

    pub max_bid_id: u64,
    pub info_hash: Option<String>,

    pub created: Provenance,
    pub last_updated: Provenance,
}

impl AuctionLot {
    /// Decimals of the token `capacity` is denominated in.
    pub fn capacity_decimals(&self) -> u8 {
        if self.capacity_in_quote {
            self.quote_decimals
        } else {
            self.base_decimals
        }
    }

    /// Advance `max_bid_id`; never moves backwards.
    pub fn observe_bid_id(&mut self, bid_id: u64) {
        self.max_bid_id = self.max_bid_id.max(bid_id);
    }
}
