pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod orchestration;
pub mod reader;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    AuctionEvent, AuctionLot, Bid, BidKey, Decimal, DerivativeLotKey, EventEnvelope,
    EventPosition, LotKey,
};
pub use engine::{
    ProjectionError, Projector, Severity, SubmittedPricePolicy, SubmittedPriceRounding,
    SubmittedPriceScale,
};
pub use error::AppError;
pub use metadata::{GatewayMetadataResolver, MetadataResolver, StaticMetadataResolver};
pub use orchestration::{IngestOutcome, IngestionError, Ingestor};
pub use reader::{ContractStateReader, MockStateReader, ReaderError, RpcStateReader};
