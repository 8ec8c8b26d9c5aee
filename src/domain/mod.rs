//! Domain types for the auction ledger.
//!
//! This module provides:
//! - Exact decimal conversion of raw integer amounts
//! - Deterministic identity keys for every aggregate
//! - Lot, bid, module extension and derivative aggregates
//! - The inbound event envelope and its ordering key

pub mod bid;
pub mod decimal;
pub mod derivative;
pub mod event;
pub mod identity;
pub mod info;
pub mod keycode;
pub mod lot;
pub mod module;
pub mod ordering;
pub mod primitives;

pub use bid::{Bid, BidOutcome, BidStatus};
pub use decimal::{fee_to_decimal, from_decimal, to_decimal, Decimal};
pub use derivative::{
    DerivativeKind, DerivativeLot, LinearVestingParams, Redemption, VestingParamsError,
};
pub use event::{AuctionEvent, EventEnvelope, EventRecord};
pub use identity::{event_record_key, BidKey, DerivativeLotKey, LotKey};
pub use info::LotInfo;
pub use keycode::{Keycode, Veecode};
pub use lot::{AuctionLot, Token};
pub use module::{
    EmpLot, EmpStatus, FpbLot, FpbStatus, LotStatus, ModuleKind, ModuleLot, SettlementSummary,
    StatusOverride,
};
pub use ordering::EventPosition;
pub use primitives::{block_date, hex_address, non_zero, BlockRef, Provenance};
