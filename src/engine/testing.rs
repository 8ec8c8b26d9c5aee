//! Fixtures shared by engine unit tests.

use super::context::EventContext;
use crate::domain::{
    AuctionLot, Bid, BidKey, BidStatus, BlockRef, Decimal, LotKey, ModuleKind, Provenance,
};
use alloy_primitives::{Address, B256, U256};

pub(crate) fn context_at(block: u64) -> EventContext {
    EventContext {
        chain: "testnet".to_string(),
        at: BlockRef::new(block),
        provenance: Provenance::new(block, 1_715_274_000 + block, B256::repeat_byte(0xee)),
        emitter: Address::repeat_byte(0xaa),
        log_index: 0,
    }
}

/// Lot with an 18-decimal base token and a 6-decimal quote token.
pub(crate) fn lot_fixture(module: ModuleKind) -> AuctionLot {
    let auction_house = Address::repeat_byte(0xaa);
    let provenance = context_at(1).provenance;
    AuctionLot {
        id: LotKey::derive("testnet", &auction_house, 1),
        chain: "testnet".to_string(),
        auction_house,
        lot_id: 1,
        base_token: Address::repeat_byte(0xb0),
        quote_token: Address::repeat_byte(0xc0),
        base_decimals: 18,
        quote_decimals: 6,
        start: 1_715_274_000,
        conclusion: 1_715_446_800,
        capacity_in_quote: false,
        capacity_initial: Decimal::from_str_canonical("100").unwrap(),
        capacity: Decimal::from_str_canonical("100").unwrap(),
        sold: Decimal::zero(),
        purchased: Decimal::zero(),
        seller: Address::repeat_byte(0x5e),
        auction_module: Address::repeat_byte(0xd0),
        auction_type: module.keycode().to_string(),
        module,
        derivative_type: None,
        derivative_lot: None,
        wrap_derivative: false,
        curator: None,
        curator_approved: false,
        curator_fee: Decimal::zero(),
        protocol_fee: Decimal::zero(),
        referrer_fee: Decimal::zero(),
        max_bid_id: 0,
        info_hash: None,
        created: provenance.clone(),
        last_updated: provenance,
    }
}

pub(crate) fn bid_fixture(lot: &LotKey, bid_id: u64) -> Bid {
    let provenance = context_at(2).provenance;
    Bid {
        id: BidKey::derive(lot, bid_id),
        lot: lot.clone(),
        bid_id,
        bidder: Address::repeat_byte(0xbb),
        referrer: None,
        amount_in: Decimal::from_str_canonical("2").unwrap(),
        raw_amount_in: U256::from(2_000_000u64),
        amount_out: None,
        raw_amount_out: None,
        submitted_price: None,
        raw_submitted_price: None,
        status: BidStatus::Submitted,
        outcome: None,
        settled_amount_in: None,
        settled_amount_in_refunded: None,
        settled_amount_out: None,
        created: provenance.clone(),
        last_updated: provenance,
    }
}
