#![allow(dead_code)]

use alloy_primitives::{Address, Bytes, B256, U256};
use auction_ledger::db::init_db;
use auction_ledger::domain::{
    AuctionEvent, AuctionLot, EmpLot, EventEnvelope, FpbLot, LotKey, ModuleLot, Veecode,
};
use auction_ledger::reader::{
    BidClaim, EmpAuctionData, FpbAuctionData, LotData, LotFees, LotRouting, ModuleBid,
    PartialFill, TokenMetadata,
};
use auction_ledger::{
    IngestOutcome, IngestionError, Ingestor, MockStateReader, Projector, Repository,
    StaticMetadataResolver, SubmittedPricePolicy,
};
use std::sync::Arc;
use tempfile::TempDir;

pub const CHAIN: &str = "testnet";
pub const HOUSE: Address = Address::repeat_byte(0xaa);
pub const EMP_MODULE: Address = Address::repeat_byte(0xd0);
pub const FPB_MODULE: Address = Address::repeat_byte(0xd1);
pub const LIV_MODULE: Address = Address::repeat_byte(0xe0);
pub const BASE: Address = Address::repeat_byte(0xb0);
pub const QUOTE: Address = Address::repeat_byte(0xc0);
pub const SELLER: Address = Address::repeat_byte(0x5e);
pub const BIDDER: Address = Address::repeat_byte(0xbb);

pub const BASE_DECIMALS: u8 = 18;
pub const QUOTE_DECIMALS: u8 = 6;

/// `n` whole base tokens.
pub fn base(n: u64) -> U256 {
    U256::from(n) * U256::from(10u8).pow(U256::from(BASE_DECIMALS))
}

/// `n` whole quote tokens.
pub fn quote(n: u64) -> U256 {
    U256::from(n) * U256::from(10u8).pow(U256::from(QUOTE_DECIMALS))
}

pub fn lot_data(sold: U256, purchased: U256) -> LotData {
    LotData {
        start: 1_715_274_000,
        conclusion: 1_715_446_800,
        quote_token_decimals: QUOTE_DECIMALS,
        base_token_decimals: BASE_DECIMALS,
        capacity_in_quote: false,
        capacity: base(100),
        sold,
        purchased,
    }
}

pub fn routing(keycode: &str) -> LotRouting {
    LotRouting {
        seller: SELLER,
        base_token: BASE,
        quote_token: QUOTE,
        auction_reference: Veecode::from_parts(1, keycode),
        derivative_reference: Veecode::new([0u8; 7]),
        wrap_derivative: false,
        derivative_params: Bytes::new(),
    }
}

pub fn fees() -> LotFees {
    LotFees {
        curator: Address::ZERO,
        curated: false,
        curator_fee: 0,
        protocol_fee: 100,
        referrer_fee: 50,
    }
}

pub fn emp_data(status: u8) -> EmpAuctionData {
    EmpAuctionData {
        status,
        marginal_price: quote(3),
        min_price: quote(1),
        min_filled: base(1),
        min_bid_size: quote(1) / U256::from(10u8),
    }
}

pub fn fpb_data(status: u8) -> FpbAuctionData {
    FpbAuctionData {
        status,
        price: quote(4),
        min_filled: base(1),
    }
}

pub fn module_bid(amount: U256, status: u8) -> ModuleBid {
    ModuleBid {
        bidder: BIDDER,
        amount,
        referrer: Address::ZERO,
        status,
    }
}

pub fn claim(paid: U256, payout: U256, refund: U256) -> BidClaim {
    BidClaim {
        bidder: BIDDER,
        referrer: Address::ZERO,
        paid,
        payout,
        refund,
    }
}

pub fn no_partial_fill() -> PartialFill {
    PartialFill {
        has_partial_fill: false,
        bid_id: 0,
        refund: U256::ZERO,
        payout: U256::ZERO,
    }
}

fn token(symbol: &str, decimals: u8) -> TokenMetadata {
    TokenMetadata {
        name: format!("{} Token", symbol),
        symbol: symbol.to_string(),
        decimals,
        total_supply: U256::from(10u8).pow(U256::from(30u8)),
    }
}

/// Reader with both tokens and every module installed, but no lots.
pub fn base_reader() -> MockStateReader {
    MockStateReader::new()
        .with_token(BASE, token("BASE", BASE_DECIMALS))
        .with_token(QUOTE, token("USDC", QUOTE_DECIMALS))
        .with_keycode_module("EMPA", EMP_MODULE)
        .with_keycode_module("FPBA", FPB_MODULE)
        .with_keycode_module("LIV", LIV_MODULE)
        .with_parent(EMP_MODULE, HOUSE)
        .with_parent(FPB_MODULE, HOUSE)
}

/// Lot 1 as a freshly created sealed-bid auction.
pub fn emp_reader() -> MockStateReader {
    base_reader()
        .with_lot(1, lot_data(U256::ZERO, U256::ZERO), routing("EMPA"), fees())
        .with_lot_module(1, EMP_MODULE)
        .with_emp_data(1, emp_data(0))
}

/// Lot 1 as a freshly created fixed-price batch auction.
pub fn fpb_reader() -> MockStateReader {
    base_reader()
        .with_lot(1, lot_data(U256::ZERO, U256::ZERO), routing("FPBA"), fees())
        .with_lot_module(1, FPB_MODULE)
        .with_fpb_data(1, fpb_data(0))
}

pub fn envelope(block_number: u64, log_index: u64, emitter: Address, event: AuctionEvent) -> EventEnvelope {
    EventEnvelope {
        emitting_address: emitter,
        block_number,
        block_timestamp: 1_715_274_000 + block_number * 2,
        transaction_hash: B256::with_last_byte(block_number as u8),
        log_index,
        event,
    }
}

pub fn lot_key(lot_id: u64) -> LotKey {
    LotKey::derive(CHAIN, &HOUSE, lot_id)
}

pub struct Harness {
    pub reader: Arc<MockStateReader>,
    pub repo: Repository,
    pub ingestor: Ingestor,
    _temp: TempDir,
}

impl Harness {
    pub async fn new(reader: MockStateReader) -> Self {
        Self::with_metadata(reader, StaticMetadataResolver::new()).await
    }

    pub async fn with_metadata(reader: MockStateReader, metadata: StaticMetadataResolver) -> Self {
        Self::build(reader, metadata, SubmittedPricePolicy::default()).await
    }

    pub async fn build(
        reader: MockStateReader,
        metadata: StaticMetadataResolver,
        price_policy: SubmittedPricePolicy,
    ) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        let repo = Repository::new(pool);

        let reader = Arc::new(reader);
        let projector = Projector::new(
            CHAIN.to_string(),
            reader.clone(),
            Arc::new(metadata),
            repo.clone(),
            price_policy,
        );
        let ingestor = Ingestor::open(projector, repo.clone()).await.unwrap();

        Self {
            reader,
            repo,
            ingestor,
            _temp: temp_dir,
        }
    }

    /// Ingest an auction house event.
    pub async fn send(
        &mut self,
        block_number: u64,
        event: AuctionEvent,
    ) -> Result<IngestOutcome, IngestionError> {
        self.send_from(HOUSE, block_number, event).await
    }

    pub async fn send_from(
        &mut self,
        emitter: Address,
        block_number: u64,
        event: AuctionEvent,
    ) -> Result<IngestOutcome, IngestionError> {
        self.ingestor
            .ingest(&envelope(block_number, 0, emitter, event))
            .await
    }

    pub async fn lot(&self, lot_id: u64) -> AuctionLot {
        self.repo.get_lot(&lot_key(lot_id)).await.unwrap().unwrap()
    }

    pub async fn emp(&self, lot_id: u64) -> EmpLot {
        match self.repo.get_module_lot(&lot_key(lot_id)).await.unwrap() {
            Some(ModuleLot::EncryptedMarginalPrice(ext)) => ext,
            other => panic!("expected EMP extension, got {other:?}"),
        }
    }

    pub async fn fpb(&self, lot_id: u64) -> FpbLot {
        match self.repo.get_module_lot(&lot_key(lot_id)).await.unwrap() {
            Some(ModuleLot::FixedPriceBatch(ext)) => ext,
            other => panic!("expected FPB extension, got {other:?}"),
        }
    }
}
