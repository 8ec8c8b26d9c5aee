//! Bid lifecycle.

use super::batch::ProjectionBatch;
use super::context::EventContext;
use super::error::ProjectionError;
use super::modules::update_bid_settlement;
use super::projector::{Handled, Projector};
use crate::domain::event::{BidAction, BidDecrypted, BidPlaced};
use crate::domain::{non_zero, to_decimal, Bid, BidKey, LotKey};
use tracing::info;

impl Projector {
    /// A new bid. The amount in and bidder come from the module's bid read;
    /// the event only identifies the bid.
    pub(crate) async fn place_bid(
        &self,
        ctx: &EventContext,
        event: &BidPlaced,
        batch: &mut ProjectionBatch,
    ) -> Result<Handled, ProjectionError> {
        let lot_key = LotKey::derive(&self.chain, &ctx.emitter, event.lot_id);
        let (mut lot, mut extension) = self.load_lot(&lot_key).await?;
        let adapter = self.modules.adapter(lot.module)?;

        let module_bid = self
            .reader
            .bid(ctx.at, lot.auction_module, lot.module, lot.lot_id, event.bid_id)
            .await?;

        let key = BidKey::derive(&lot_key, event.bid_id);
        let mut bid = Bid {
            id: key.clone(),
            lot: lot_key.clone(),
            bid_id: event.bid_id,
            bidder: module_bid.bidder,
            referrer: non_zero(module_bid.referrer),
            amount_in: to_decimal(module_bid.amount, lot.quote_decimals),
            raw_amount_in: module_bid.amount,
            amount_out: None,
            raw_amount_out: None,
            submitted_price: None,
            raw_submitted_price: None,
            status: adapter.decode_bid_status(module_bid.status)?,
            outcome: None,
            settled_amount_in: None,
            settled_amount_in_refunded: None,
            settled_amount_out: None,
            created: ctx.provenance.clone(),
            last_updated: ctx.provenance.clone(),
        };
        adapter.on_bid_created(ctx, &lot, &extension, &mut bid).await?;

        self.refresh_accounting(ctx, &mut lot, &mut extension, Some(event.bid_id), None)
            .await?;

        info!(
            lot = %lot_key,
            bid = event.bid_id,
            amount_in = %bid.amount_in,
            "Bid placed"
        );

        batch.put_bid(bid);
        batch.put_lot(lot);
        batch.put_module_lot(extension);
        Ok(Handled::Applied {
            lot: Some(lot_key),
            bid: Some(key),
        })
    }

    /// Emitted by the auction module, so the auction house is resolved from
    /// the module's parent.
    pub(crate) async fn decrypt_bid(
        &self,
        ctx: &EventContext,
        event: &BidDecrypted,
        batch: &mut ProjectionBatch,
    ) -> Result<Handled, ProjectionError> {
        let auction_house = self.reader.module_parent(ctx.at, ctx.emitter).await?;
        let lot_key = LotKey::derive(&self.chain, &auction_house, event.lot_id);
        let (mut lot, mut extension) = self.load_lot(&lot_key).await?;

        let key = BidKey::derive(&lot_key, event.bid_id);
        let Some(mut bid) = self.repo.get_bid(&key).await? else {
            return Ok(Handled::Skipped(format!("no bid {}", key)));
        };

        let adapter = self.modules.adapter(lot.module)?;
        adapter
            .on_bid_decrypted(ctx, &lot, &mut bid, event.amount_in, event.amount_out)
            .await?;
        adapter.update_bid_status(ctx, &lot, &mut bid).await?;

        self.refresh_accounting(ctx, &mut lot, &mut extension, None, None)
            .await?;

        batch.put_bid(bid);
        batch.put_lot(lot);
        batch.put_module_lot(extension);
        Ok(Handled::Applied {
            lot: Some(lot_key),
            bid: Some(key),
        })
    }

    /// Refund and claim. Both move the bid to its terminal status; a claim
    /// also carries settlement amounts.
    pub(crate) async fn close_bid(
        &self,
        ctx: &EventContext,
        event: &BidAction,
        with_claim: bool,
        batch: &mut ProjectionBatch,
    ) -> Result<Handled, ProjectionError> {
        let lot_key = LotKey::derive(&self.chain, &ctx.emitter, event.lot_id);
        let (mut lot, mut extension) = self.load_lot(&lot_key).await?;

        let key = BidKey::derive(&lot_key, event.bid_id);
        let Some(mut bid) = self.repo.get_bid(&key).await? else {
            return Ok(Handled::Skipped(format!("no bid {}", key)));
        };

        let adapter = self.modules.adapter(lot.module)?;
        adapter.update_bid_status(ctx, &lot, &mut bid).await?;

        if with_claim {
            let claim = self
                .reader
                .bid_claim(ctx.at, lot.auction_module, lot.lot_id, bid.bid_id)
                .await?;
            update_bid_settlement(&mut bid, &claim, &lot);
        }

        self.refresh_accounting(ctx, &mut lot, &mut extension, None, None)
            .await?;

        info!(
            lot = %lot_key,
            bid = event.bid_id,
            status = ?bid.status,
            outcome = ?bid.outcome,
            "Bid closed"
        );

        batch.put_bid(bid);
        batch.put_lot(lot);
        batch.put_module_lot(extension);
        Ok(Handled::Applied {
            lot: Some(lot_key),
            bid: Some(key),
        })
    }
}
