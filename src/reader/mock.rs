//! Mock state reader for testing without network calls.

use super::{
    BidClaim, ContractStateReader, EmpAuctionData, FpbAuctionData, LotData, LotFees, LotRouting,
    ModuleBid, PartialFill, ReaderError, TokenMetadata,
};
use crate::domain::{BlockRef, Keycode, ModuleKind};
use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MockState {
    lot_data: HashMap<u64, LotData>,
    lot_routing: HashMap<u64, LotRouting>,
    lot_fees: HashMap<u64, LotFees>,
    keycode_modules: HashMap<String, Address>,
    lot_modules: HashMap<u64, Address>,
    parents: HashMap<Address, Address>,
    emp_data: HashMap<u64, EmpAuctionData>,
    fpb_data: HashMap<u64, FpbAuctionData>,
    bids: HashMap<(u64, u64), ModuleBid>,
    claims: HashMap<(u64, u64), BidClaim>,
    partial_fills: HashMap<u64, PartialFill>,
    tokens: HashMap<Address, TokenMetadata>,
    derivative_ids: HashMap<(Address, Address), U256>,
    balances: HashMap<(Address, Address, U256), U256>,
    read_blocks: Vec<BlockRef>,
    token_reads: HashMap<Address, usize>,
}

/// Mock reader that returns predefined contract state.
///
/// Lot-scoped values are keyed by lot id alone, so one mock serves a single
/// auction house. Setters take `&self` so tests can move state forward
/// between events while the reader is shared behind an `Arc`.
#[derive(Debug, Default)]
pub struct MockStateReader {
    state: Mutex<MockState>,
}

impl MockStateReader {
    /// Create a new mock reader with no state.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register the three auction house views of a lot.
    pub fn with_lot(self, lot_id: u64, data: LotData, routing: LotRouting, fees: LotFees) -> Self {
        self.set_lot_data(lot_id, data);
        self.set_lot_fees(lot_id, fees);
        self.state().lot_routing.insert(lot_id, routing);
        self
    }

    /// Install a module on the auction house under a keycode.
    pub fn with_keycode_module(self, keycode: &str, module: Address) -> Self {
        self.state()
            .keycode_modules
            .insert(keycode.to_string(), module);
        self
    }

    pub fn with_lot_module(self, lot_id: u64, module: Address) -> Self {
        self.state().lot_modules.insert(lot_id, module);
        self
    }

    pub fn with_parent(self, module: Address, auction_house: Address) -> Self {
        self.state().parents.insert(module, auction_house);
        self
    }

    pub fn with_emp_data(self, lot_id: u64, data: EmpAuctionData) -> Self {
        self.set_emp_data(lot_id, data);
        self
    }

    pub fn with_fpb_data(self, lot_id: u64, data: FpbAuctionData) -> Self {
        self.set_fpb_data(lot_id, data);
        self
    }

    pub fn with_bid(self, lot_id: u64, bid_id: u64, bid: ModuleBid) -> Self {
        self.set_bid(lot_id, bid_id, bid);
        self
    }

    pub fn with_token(self, token: Address, metadata: TokenMetadata) -> Self {
        self.state().tokens.insert(token, metadata);
        self
    }

    pub fn with_derivative_id(self, module: Address, underlying: Address, token_id: U256) -> Self {
        self.state()
            .derivative_ids
            .insert((module, underlying), token_id);
        self
    }

    pub fn set_lot_data(&self, lot_id: u64, data: LotData) {
        self.state().lot_data.insert(lot_id, data);
    }

    pub fn set_lot_fees(&self, lot_id: u64, fees: LotFees) {
        self.state().lot_fees.insert(lot_id, fees);
    }

    pub fn set_emp_data(&self, lot_id: u64, data: EmpAuctionData) {
        self.state().emp_data.insert(lot_id, data);
    }

    pub fn set_fpb_data(&self, lot_id: u64, data: FpbAuctionData) {
        self.state().fpb_data.insert(lot_id, data);
    }

    pub fn set_bid(&self, lot_id: u64, bid_id: u64, bid: ModuleBid) {
        self.state().bids.insert((lot_id, bid_id), bid);
    }

    pub fn set_bid_status(&self, lot_id: u64, bid_id: u64, status: u8) {
        if let Some(bid) = self.state().bids.get_mut(&(lot_id, bid_id)) {
            bid.status = status;
        }
    }

    pub fn set_claim(&self, lot_id: u64, bid_id: u64, claim: BidClaim) {
        self.state().claims.insert((lot_id, bid_id), claim);
    }

    pub fn set_partial_fill(&self, lot_id: u64, fill: PartialFill) {
        self.state().partial_fills.insert(lot_id, fill);
    }

    pub fn set_balance(&self, module: Address, holder: Address, token_id: U256, balance: U256) {
        self.state()
            .balances
            .insert((module, holder, token_id), balance);
    }

    /// Blocks every read was anchored at, in call order.
    pub fn read_blocks(&self) -> Vec<BlockRef> {
        self.state().read_blocks.clone()
    }

    /// Number of metadata reads issued for a token.
    pub fn token_reads(&self, token: Address) -> usize {
        self.state().token_reads.get(&token).copied().unwrap_or_default()
    }

    fn lookup<K, V>(
        &self,
        at: BlockRef,
        select: impl FnOnce(&MockState) -> &HashMap<K, V>,
        key: &K,
        what: impl FnOnce() -> String,
    ) -> Result<V, ReaderError>
    where
        K: std::hash::Hash + Eq,
        V: Clone,
    {
        let mut state = self.state();
        state.read_blocks.push(at);
        select(&*state)
            .get(key)
            .cloned()
            .ok_or_else(|| ReaderError::NotAvailable(what()))
    }
}

#[async_trait]
impl ContractStateReader for MockStateReader {
    async fn lot_data(
        &self,
        at: BlockRef,
        _auction_house: Address,
        lot_id: u64,
    ) -> Result<LotData, ReaderError> {
        self.lookup(at, |s| &s.lot_data, &lot_id, || format!("lotData({lot_id})"))
    }

    async fn lot_routing(
        &self,
        at: BlockRef,
        _auction_house: Address,
        lot_id: u64,
    ) -> Result<LotRouting, ReaderError> {
        self.lookup(at, |s| &s.lot_routing, &lot_id, || format!("lotRouting({lot_id})"))
    }

    async fn lot_fees(
        &self,
        at: BlockRef,
        _auction_house: Address,
        lot_id: u64,
    ) -> Result<LotFees, ReaderError> {
        self.lookup(at, |s| &s.lot_fees, &lot_id, || format!("lotFees({lot_id})"))
    }

    async fn module_for_keycode(
        &self,
        at: BlockRef,
        _auction_house: Address,
        keycode: &Keycode,
    ) -> Result<Address, ReaderError> {
        let key = keycode.as_str().to_string();
        self.lookup(at, |s| &s.keycode_modules, &key, || {
            format!("getModuleForKeycode({keycode})")
        })
    }

    async fn module_for_lot_id(
        &self,
        at: BlockRef,
        _auction_house: Address,
        lot_id: u64,
    ) -> Result<Address, ReaderError> {
        self.lookup(at, |s| &s.lot_modules, &lot_id, || {
            format!("getModuleForId({lot_id})")
        })
    }

    async fn module_parent(&self, at: BlockRef, module: Address) -> Result<Address, ReaderError> {
        self.lookup(at, |s| &s.parents, &module, || format!("PARENT({module})"))
    }

    async fn emp_auction_data(
        &self,
        at: BlockRef,
        _module: Address,
        lot_id: u64,
    ) -> Result<EmpAuctionData, ReaderError> {
        self.lookup(at, |s| &s.emp_data, &lot_id, || format!("EMP auctionData({lot_id})"))
    }

    async fn fpb_auction_data(
        &self,
        at: BlockRef,
        _module: Address,
        lot_id: u64,
    ) -> Result<FpbAuctionData, ReaderError> {
        self.lookup(at, |s| &s.fpb_data, &lot_id, || format!("FPB auctionData({lot_id})"))
    }

    async fn bid(
        &self,
        at: BlockRef,
        _module: Address,
        _kind: ModuleKind,
        lot_id: u64,
        bid_id: u64,
    ) -> Result<ModuleBid, ReaderError> {
        self.lookup(at, |s| &s.bids, &(lot_id, bid_id), || {
            format!("bids({lot_id}, {bid_id})")
        })
    }

    async fn bid_claim(
        &self,
        at: BlockRef,
        _module: Address,
        lot_id: u64,
        bid_id: u64,
    ) -> Result<BidClaim, ReaderError> {
        self.lookup(at, |s| &s.claims, &(lot_id, bid_id), || {
            format!("getBidClaim({lot_id}, {bid_id})")
        })
    }

    async fn partial_fill(
        &self,
        at: BlockRef,
        _module: Address,
        lot_id: u64,
    ) -> Result<PartialFill, ReaderError> {
        self.lookup(at, |s| &s.partial_fills, &lot_id, || {
            format!("getPartialFill({lot_id})")
        })
    }

    async fn token_metadata(
        &self,
        at: BlockRef,
        token: Address,
    ) -> Result<TokenMetadata, ReaderError> {
        *self.state().token_reads.entry(token).or_default() += 1;
        self.lookup(at, |s| &s.tokens, &token, || format!("token({token})"))
    }

    async fn derivative_token_id(
        &self,
        at: BlockRef,
        module: Address,
        underlying: Address,
        _params: &Bytes,
    ) -> Result<U256, ReaderError> {
        self.lookup(at, |s| &s.derivative_ids, &(module, underlying), || {
            format!("computeId({underlying})")
        })
    }

    async fn derivative_balance_of(
        &self,
        at: BlockRef,
        module: Address,
        holder: Address,
        token_id: U256,
    ) -> Result<U256, ReaderError> {
        self.lookup(at, |s| &s.balances, &(module, holder, token_id), || {
            format!("balanceOf({holder}, {token_id})")
        })
    }
}
