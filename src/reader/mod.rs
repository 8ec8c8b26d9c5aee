//! Read-only access to authoritative contract state.

use crate::domain::{BlockRef, Keycode, ModuleKind, Veecode};
use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use std::fmt;

pub mod abi;
pub mod mock;
pub mod rpc;

pub use mock::MockStateReader;
pub use rpc::RpcStateReader;

/// Lot state held by the auction house.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotData {
    pub start: u64,
    pub conclusion: u64,
    pub quote_token_decimals: u8,
    pub base_token_decimals: u8,
    pub capacity_in_quote: bool,
    pub capacity: U256,
    pub sold: U256,
    pub purchased: U256,
}

/// Routing configuration of a lot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotRouting {
    pub seller: Address,
    pub base_token: Address,
    pub quote_token: Address,
    pub auction_reference: Veecode,
    pub derivative_reference: Veecode,
    pub wrap_derivative: bool,
    pub derivative_params: Bytes,
}

/// Fee configuration of a lot, each fee in units of 1e-5.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotFees {
    pub curator: Address,
    pub curated: bool,
    pub curator_fee: u64,
    pub protocol_fee: u64,
    pub referrer_fee: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmpAuctionData {
    pub status: u8,
    pub marginal_price: U256,
    pub min_price: U256,
    pub min_filled: U256,
    pub min_bid_size: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FpbAuctionData {
    pub status: u8,
    pub price: U256,
    pub min_filled: U256,
}

/// A bid as stored by its auction module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleBid {
    pub bidder: Address,
    pub amount: U256,
    pub referrer: Address,
    pub status: u8,
}

/// What a bidder is owed (or was paid) once a lot is settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidClaim {
    pub bidder: Address,
    pub referrer: Address,
    pub paid: U256,
    pub payout: U256,
    pub refund: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialFill {
    pub has_partial_fill: bool,
    pub bid_id: u64,
    pub refund: U256,
    pub payout: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: U256,
}

/// Synchronous-in-effect, read-only view of contract state.
///
/// Every read is anchored at the block of the event being processed, never
/// at "latest", so replays observe identical values.
#[async_trait]
pub trait ContractStateReader: Send + Sync + fmt::Debug {
    async fn lot_data(
        &self,
        at: BlockRef,
        auction_house: Address,
        lot_id: u64,
    ) -> Result<LotData, ReaderError>;

    async fn lot_routing(
        &self,
        at: BlockRef,
        auction_house: Address,
        lot_id: u64,
    ) -> Result<LotRouting, ReaderError>;

    async fn lot_fees(
        &self,
        at: BlockRef,
        auction_house: Address,
        lot_id: u64,
    ) -> Result<LotFees, ReaderError>;

    /// Latest module installed on the auction house for a keycode.
    async fn module_for_keycode(
        &self,
        at: BlockRef,
        auction_house: Address,
        keycode: &Keycode,
    ) -> Result<Address, ReaderError>;

    /// Module instance that governs one lot.
    async fn module_for_lot_id(
        &self,
        at: BlockRef,
        auction_house: Address,
        lot_id: u64,
    ) -> Result<Address, ReaderError>;

    /// Auction house a module instance is installed on.
    async fn module_parent(&self, at: BlockRef, module: Address) -> Result<Address, ReaderError>;

    async fn emp_auction_data(
        &self,
        at: BlockRef,
        module: Address,
        lot_id: u64,
    ) -> Result<EmpAuctionData, ReaderError>;

    async fn fpb_auction_data(
        &self,
        at: BlockRef,
        module: Address,
        lot_id: u64,
    ) -> Result<FpbAuctionData, ReaderError>;

    async fn bid(
        &self,
        at: BlockRef,
        module: Address,
        kind: ModuleKind,
        lot_id: u64,
        bid_id: u64,
    ) -> Result<ModuleBid, ReaderError>;

    async fn bid_claim(
        &self,
        at: BlockRef,
        module: Address,
        lot_id: u64,
        bid_id: u64,
    ) -> Result<BidClaim, ReaderError>;

    async fn partial_fill(
        &self,
        at: BlockRef,
        module: Address,
        lot_id: u64,
    ) -> Result<PartialFill, ReaderError>;

    async fn token_metadata(
        &self,
        at: BlockRef,
        token: Address,
    ) -> Result<TokenMetadata, ReaderError>;

    /// Token id the derivative module assigns to `(underlying, params)`.
    async fn derivative_token_id(
        &self,
        at: BlockRef,
        module: Address,
        underlying: Address,
        params: &Bytes,
    ) -> Result<U256, ReaderError>;

    async fn derivative_balance_of(
        &self,
        at: BlockRef,
        module: Address,
        holder: Address,
        token_id: U256,
    ) -> Result<U256, ReaderError>;
}

/// Error type for state reads.
#[derive(Debug, Clone)]
pub enum ReaderError {
    /// Network error (connection refused, timeout, DNS failure)
    NetworkError(String),
    /// HTTP error from the RPC endpoint
    HttpError { status: u16, message: String },
    /// JSON-RPC error object, e.g. an execution revert
    RpcError { code: i64, message: String },
    /// Response could not be decoded
    DecodeError(String),
    /// Rate limit exceeded (retried with backoff before surfacing)
    RateLimited,
    /// The queried value does not exist at this block
    NotAvailable(String),
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReaderError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            ReaderError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            ReaderError::RpcError { code, message } => {
                write!(f, "RPC error {}: {}", code, message)
            }
            ReaderError::DecodeError(msg) => write!(f, "Decode error: {}", msg),
            ReaderError::RateLimited => write!(f, "Rate limited"),
            ReaderError::NotAvailable(msg) => write!(f, "Not available: {}", msg),
        }
    }
}

impl std::error::Error for ReaderError {}
