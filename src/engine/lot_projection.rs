//! Auction lot lifecycle.

use super::batch::ProjectionBatch;
use super::context::EventContext;
use super::error::ProjectionError;
use super::modules::update_bid_settlement;
use super::projector::{Handled, Projector};
use crate::domain::{
    event::AuctionCreated, fee_to_decimal, non_zero, to_decimal, AuctionLot, DerivativeKind,
    LotKey, ModuleLot, StatusOverride,
};
use crate::reader::LotFees;
use tracing::info;

fn apply_fees(lot: &mut AuctionLot, fees: &LotFees) {
    lot.curator = non_zero(fees.curator);
    lot.curator_approved = fees.curated;
    lot.curator_fee = fee_to_decimal(fees.curator_fee);
    lot.protocol_fee = fee_to_decimal(fees.protocol_fee);
    lot.referrer_fee = fee_to_decimal(fees.referrer_fee);
}

impl Projector {
    pub(crate) async fn create_lot(
        &self,
        ctx: &EventContext,
        event: &AuctionCreated,
        batch: &mut ProjectionBatch,
    ) -> Result<Handled, ProjectionError> {
        let auction_house = ctx.emitter;
        let key = LotKey::derive(&self.chain, &auction_house, event.lot_id);

        let (data, routing, fees) = futures::try_join!(
            self.reader.lot_data(ctx.at, auction_house, event.lot_id),
            self.reader.lot_routing(ctx.at, auction_house, event.lot_id),
            self.reader.lot_fees(ctx.at, auction_house, event.lot_id),
        )?;

        let keycode = routing.auction_reference.keycode();
        let module = self.modules.resolve(&keycode)?;
        let adapter = self.modules.adapter(module)?;
        let auction_module = self
            .reader
            .module_for_lot_id(ctx.at, auction_house, event.lot_id)
            .await?;

        self.tokens.resolve(ctx.at, routing.base_token, batch).await?;
        self.tokens.resolve(ctx.at, routing.quote_token, batch).await?;

        let capacity_decimals = if data.capacity_in_quote {
            data.quote_token_decimals
        } else {
            data.base_token_decimals
        };
        let capacity = to_decimal(data.capacity, capacity_decimals);

        let mut lot = AuctionLot {
            id: key.clone(),
            chain: self.chain.clone(),
            auction_house,
            lot_id: event.lot_id,
            base_token: routing.base_token,
            quote_token: routing.quote_token,
            base_decimals: data.base_token_decimals,
            quote_decimals: data.quote_token_decimals,
            start: data.start,
            conclusion: data.conclusion,
            capacity_in_quote: data.capacity_in_quote,
            capacity_initial: capacity.clone(),
            capacity,
            sold: to_decimal(data.sold, data.base_token_decimals),
            purchased: to_decimal(data.purchased, data.quote_token_decimals),
            seller: routing.seller,
            auction_module,
            auction_type: keycode.to_string(),
            module,
            derivative_type: None,
            derivative_lot: None,
            wrap_derivative: routing.wrap_derivative,
            curator: None,
            curator_approved: false,
            curator_fee: Default::default(),
            protocol_fee: Default::default(),
            referrer_fee: Default::default(),
            max_bid_id: 0,
            info_hash: event.info_hash.clone().filter(|hash| !hash.is_empty()),
            created: ctx.provenance.clone(),
            last_updated: ctx.provenance.clone(),
        };
        apply_fees(&mut lot, &fees);

        let extension = adapter.create_extension(ctx, &lot).await?;

        if !routing.derivative_reference.is_empty() {
            let derivative_keycode = routing.derivative_reference.keycode();
            DerivativeKind::from_keycode(&derivative_keycode)
                .ok_or_else(|| ProjectionError::UnknownKeycode(derivative_keycode.to_string()))?;

            let derivative = self
                .vesting
                .create_derivative_lot(ctx, &lot, auction_house, &routing)
                .await?;
            lot.derivative_type = Some(derivative_keycode.to_string());
            lot.derivative_lot = Some(derivative.id.clone());

            // the token id depends only on underlying and params, so lots
            // can share a derivative lot; the first creator owns it
            match self.repo.get_derivative_lot(&derivative.id).await? {
                Some(existing) => info!(
                    lot = %key,
                    derivative = %existing.id,
                    owner = %existing.lot,
                    "Reusing existing derivative lot"
                ),
                None => batch.put_derivative_lot(derivative),
            }
        }

        if let Some(hash) = &lot.info_hash {
            self.resolve_info(hash, &key, batch).await;
        }

        info!(
            lot = %key,
            module = %module,
            capacity = %lot.capacity,
            tx = %ctx.provenance.transaction_hash,
            "Created auction lot"
        );

        batch.put_lot(lot);
        batch.put_module_lot(extension);
        Ok(Handled::Applied {
            lot: Some(key),
            bid: None,
        })
    }

    /// Re-read accounting and fees, then the module extension.
    ///
    /// Capacity, sold and purchased are overwritten from the read, never
    /// adjusted locally.
    pub(crate) async fn refresh_accounting(
        &self,
        ctx: &EventContext,
        lot: &mut AuctionLot,
        extension: &mut ModuleLot,
        bid_id: Option<u64>,
        status_override: Option<StatusOverride>,
    ) -> Result<(), ProjectionError> {
        let (data, fees) = futures::try_join!(
            self.reader.lot_data(ctx.at, lot.auction_house, lot.lot_id),
            self.reader.lot_fees(ctx.at, lot.auction_house, lot.lot_id),
        )?;

        lot.conclusion = data.conclusion;
        lot.capacity = to_decimal(data.capacity, lot.capacity_decimals());
        lot.sold = to_decimal(data.sold, lot.base_decimals);
        lot.purchased = to_decimal(data.purchased, lot.quote_decimals);
        apply_fees(lot, &fees);
        if let Some(bid_id) = bid_id {
            lot.observe_bid_id(bid_id);
        }
        lot.last_updated = ctx.provenance.clone();

        self.modules
            .adapter(lot.module)?
            .update_extension(ctx, lot, extension, status_override)
            .await
    }

    /// Cancel and curate: refresh only.
    pub(crate) async fn update_lot(
        &self,
        ctx: &EventContext,
        lot_id: u64,
        status_override: Option<StatusOverride>,
        batch: &mut ProjectionBatch,
    ) -> Result<Handled, ProjectionError> {
        let key = LotKey::derive(&self.chain, &ctx.emitter, lot_id);
        let (mut lot, mut extension) = self.load_lot(&key).await?;

        self.refresh_accounting(ctx, &mut lot, &mut extension, None, status_override)
            .await?;

        if let Some(status_override) = status_override {
            info!(lot = %key, status = ?status_override, "Lot status overridden");
        }

        batch.put_lot(lot);
        batch.put_module_lot(extension);
        Ok(Handled::Applied {
            lot: Some(key),
            bid: None,
        })
    }

    /// Settle and abort: refresh, then write every bid's settlement from its
    /// authoritative claim.
    pub(crate) async fn settle_lot(
        &self,
        ctx: &EventContext,
        lot_id: u64,
        status_override: Option<StatusOverride>,
        batch: &mut ProjectionBatch,
    ) -> Result<Handled, ProjectionError> {
        let key = LotKey::derive(&self.chain, &ctx.emitter, lot_id);
        let (mut lot, mut extension) = self.load_lot(&key).await?;

        self.refresh_accounting(ctx, &mut lot, &mut extension, None, status_override)
            .await?;

        let bids = self.repo.bids_for_lot(&key).await?;
        let bid_count = bids.len();
        for mut bid in bids {
            let claim = self
                .reader
                .bid_claim(ctx.at, lot.auction_module, lot.lot_id, bid.bid_id)
                .await?;
            update_bid_settlement(&mut bid, &claim, &lot);
            bid.last_updated = ctx.provenance.clone();
            batch.put_bid(bid);
        }

        info!(
            lot = %key,
            bids = bid_count,
            sold = %lot.sold,
            purchased = %lot.purchased,
            "Lot settlement recorded"
        );

        batch.put_lot(lot);
        batch.put_module_lot(extension);
        Ok(Handled::Applied {
            lot: Some(key),
            bid: None,
        })
    }
}
