//! Projection engine: turns events plus authoritative reads into aggregate
//! writes.
//!
//! This module provides:
//! - `Projector`, dispatching each event to the lot or bid projection
//! - Module adapters for encrypted marginal price and fixed-price batch lots
//! - The linear vesting derivative adapter
//! - A read-through token cache
//! - The projection error taxonomy and its severities

pub mod batch;
mod bid_projection;
pub mod context;
pub mod derivative;
pub mod error;
mod lot_projection;
pub mod modules;
pub mod projector;
pub mod token_cache;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::ProjectionBatch;
pub use context::EventContext;
pub use derivative::LinearVestingAdapter;
pub use error::{ProjectionError, Severity};
pub use modules::{
    classify_bid_outcome, update_bid_settlement, ModuleAdapter, ModuleRegistry,
    SubmittedPricePolicy, SubmittedPriceRounding, SubmittedPriceScale,
};
pub use projector::{Projection, ProjectionOutcome, Projector};
pub use token_cache::TokenCache;
