//! Event dispatch into lot and bid projections.

use super::batch::ProjectionBatch;
use super::context::EventContext;
use super::derivative::LinearVestingAdapter;
use super::error::ProjectionError;
use super::modules::{ModuleRegistry, SubmittedPricePolicy};
use super::token_cache::TokenCache;
use crate::db::Repository;
use crate::domain::{
    AuctionEvent, AuctionLot, BidKey, DerivativeLotKey, EventEnvelope, EventRecord, LotKey,
    ModuleLot, StatusOverride,
};
use crate::metadata::{parse_lot_metadata, MetadataResolver};
use crate::reader::ContractStateReader;
use std::sync::Arc;
use tracing::{debug, warn};

/// Whether an event changed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionOutcome {
    Applied,
    /// A referenced child aggregate belongs to another integration.
    Skipped { reason: String },
}

/// Writes of one event plus how it was handled.
#[derive(Debug, Clone)]
pub struct Projection {
    pub batch: ProjectionBatch,
    pub outcome: ProjectionOutcome,
}

/// Result of a single handler, before the audit record is attached.
pub(crate) enum Handled {
    Applied {
        lot: Option<LotKey>,
        bid: Option<BidKey>,
    },
    Skipped(String),
}

/// Projects events into aggregate writes. Reads go through the store and
/// the contract state reader; nothing is written until the batch is applied.
#[derive(Debug)]
pub struct Projector {
    pub(crate) chain: String,
    pub(crate) reader: Arc<dyn ContractStateReader>,
    pub(crate) metadata: Arc<dyn MetadataResolver>,
    pub(crate) repo: Repository,
    pub(crate) modules: ModuleRegistry,
    pub(crate) vesting: LinearVestingAdapter,
    pub(crate) tokens: TokenCache,
}

impl Projector {
    pub fn new(
        chain: String,
        reader: Arc<dyn ContractStateReader>,
        metadata: Arc<dyn MetadataResolver>,
        repo: Repository,
        price_policy: SubmittedPricePolicy,
    ) -> Self {
        Self {
            modules: ModuleRegistry::with_defaults(reader.clone(), price_policy),
            vesting: LinearVestingAdapter::new(reader.clone()),
            tokens: TokenCache::new(chain.clone(), reader.clone(), repo.clone()),
            chain,
            reader,
            metadata,
            repo,
        }
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    /// Project one event.
    ///
    /// # Errors
    /// Fails when a parent lot is missing, an authoritative read fails, or
    /// decoded contract data violates the module's contract. See
    /// [`ProjectionError::severity`].
    pub async fn project(&self, envelope: &EventEnvelope) -> Result<Projection, ProjectionError> {
        let ctx = EventContext::new(&self.chain, envelope);
        let mut batch = ProjectionBatch::new();

        debug!(
            event = envelope.event.name(),
            block = envelope.block_number,
            log_index = envelope.log_index,
            "Projecting event"
        );

        let handled = match &envelope.event {
            AuctionEvent::AuctionCreated(event) => self.create_lot(&ctx, event, &mut batch).await?,
            AuctionEvent::AuctionCancelled(event) => {
                self.update_lot(&ctx, event.lot_id, Some(StatusOverride::Cancelled), &mut batch)
                    .await?
            }
            AuctionEvent::Curated(event) => {
                self.update_lot(&ctx, event.lot_id, None, &mut batch).await?
            }
            AuctionEvent::Settle(event) => {
                self.settle_lot(&ctx, event.lot_id, None, &mut batch).await?
            }
            AuctionEvent::Abort(event) => {
                self.settle_lot(&ctx, event.lot_id, Some(StatusOverride::Aborted), &mut batch)
                    .await?
            }
            AuctionEvent::Bid(event) => self.place_bid(&ctx, event, &mut batch).await?,
            AuctionEvent::BidDecrypted(event) => self.decrypt_bid(&ctx, event, &mut batch).await?,
            AuctionEvent::RefundBid(event) => {
                self.close_bid(&ctx, event, false, &mut batch).await?
            }
            AuctionEvent::ClaimBid(event) => self.close_bid(&ctx, event, true, &mut batch).await?,
            AuctionEvent::Redeemed(event) => self.redeem(&ctx, event, &mut batch).await?,
            AuctionEvent::AuctionRegistered(event) => {
                let lot = LotKey::derive(&self.chain, &event.auction_house, event.lot_id);
                self.resolve_info(&event.info_hash, &lot, &mut batch).await;
                Handled::Applied {
                    lot: Some(lot),
                    bid: None,
                }
            }
        };

        let outcome = match handled {
            Handled::Applied { lot, bid } => {
                batch.put_event_record(EventRecord::new(&self.chain, envelope, lot, bid));
                ProjectionOutcome::Applied
            }
            Handled::Skipped(reason) => {
                warn!(
                    event = envelope.event.name(),
                    tx = %envelope.transaction_hash,
                    log_index = envelope.log_index,
                    reason = %reason,
                    "Skipping event"
                );
                ProjectionOutcome::Skipped { reason }
            }
        };

        Ok(Projection { batch, outcome })
    }

    /// Load a lot and its module extension; both must exist.
    pub(crate) async fn load_lot(
        &self,
        key: &LotKey,
    ) -> Result<(AuctionLot, ModuleLot), ProjectionError> {
        let lot = self
            .repo
            .get_lot(key)
            .await?
            .ok_or_else(|| ProjectionError::LotNotFound(key.clone()))?;
        let extension = self
            .repo
            .get_module_lot(key)
            .await?
            .ok_or_else(|| ProjectionError::ExtensionNotFound(key.clone()))?;
        Ok((lot, extension))
    }

    /// Attach content metadata to a lot. An unavailable document is skipped.
    pub(crate) async fn resolve_info(&self, hash: &str, lot: &LotKey, batch: &mut ProjectionBatch) {
        if hash.is_empty() {
            return;
        }
        match self.metadata.fetch(hash).await {
            Some(document) => {
                batch.put_lot_info(parse_lot_metadata(&document).into_info(hash, lot.clone()));
            }
            None => warn!(lot = %lot, hash, "Lot metadata unavailable, skipping info"),
        }
    }

    async fn redeem(
        &self,
        ctx: &EventContext,
        event: &crate::domain::event::Redeemed,
        batch: &mut ProjectionBatch,
    ) -> Result<Handled, ProjectionError> {
        let key = DerivativeLotKey::derive(&self.chain, &ctx.emitter, event.token_id);
        let Some(derivative) = self.repo.get_derivative_lot(&key).await? else {
            return Ok(Handled::Skipped(format!("no derivative lot {}", key)));
        };

        let redemption = self.vesting.redeem(ctx, &derivative, event).await?;
        batch.put_redemption(redemption);
        Ok(Handled::Applied {
            lot: Some(derivative.lot),
            bid: None,
        })
    }
}
