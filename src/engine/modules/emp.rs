//! Encrypted marginal price (sealed-bid) auctions.

use super::{read_settlement, ModuleAdapter, SubmittedPricePolicy};
use crate::domain::{
    module::next_status, to_decimal, AuctionLot, Bid, BidStatus, EmpLot, EmpStatus, LotStatus,
    ModuleKind, ModuleLot, SettlementSummary, StatusOverride,
};
use crate::engine::context::EventContext;
use crate::engine::error::ProjectionError;
use crate::reader::ContractStateReader;
use alloy_primitives::U256;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

const MODULE: &str = "EMPA";

#[derive(Debug, Clone)]
pub struct EncryptedMarginalPriceAdapter {
    reader: Arc<dyn ContractStateReader>,
    price_policy: SubmittedPricePolicy,
}

impl EncryptedMarginalPriceAdapter {
    pub fn new(reader: Arc<dyn ContractStateReader>, price_policy: SubmittedPricePolicy) -> Self {
        Self {
            reader,
            price_policy,
        }
    }
}

fn decode_lot_status(code: u8) -> Result<EmpStatus, ProjectionError> {
    match code {
        0 => Ok(EmpStatus::Created),
        1 => Ok(EmpStatus::Decrypted),
        2 => Ok(EmpStatus::Settled),
        code => Err(ProjectionError::UnknownStatus {
            module: MODULE,
            code,
        }),
    }
}

#[async_trait]
impl ModuleAdapter for EncryptedMarginalPriceAdapter {
    fn kind(&self) -> ModuleKind {
        ModuleKind::EncryptedMarginalPrice
    }

    fn reader(&self) -> &dyn ContractStateReader {
        self.reader.as_ref()
    }

    async fn create_extension(
        &self,
        ctx: &EventContext,
        lot: &AuctionLot,
    ) -> Result<ModuleLot, ProjectionError> {
        let data = self
            .reader
            .emp_auction_data(ctx.at, lot.auction_module, lot.lot_id)
            .await?;

        Ok(ModuleLot::EncryptedMarginalPrice(EmpLot {
            lot: lot.id.clone(),
            status: decode_lot_status(data.status)?,
            min_price: to_decimal(data.min_price, lot.quote_decimals),
            min_filled: to_decimal(data.min_filled, lot.base_decimals),
            min_bid_size: to_decimal(data.min_bid_size, lot.quote_decimals),
            marginal_price: None,
            settlement: SettlementSummary::default(),
            last_updated: ctx.provenance.clone(),
        }))
    }

    async fn update_extension(
        &self,
        ctx: &EventContext,
        lot: &AuctionLot,
        extension: &mut ModuleLot,
        status_override: Option<StatusOverride>,
    ) -> Result<(), ProjectionError> {
        let ModuleLot::EncryptedMarginalPrice(ext) = extension else {
            return Err(ProjectionError::ModuleMismatch {
                lot: lot.id.clone(),
                expected: MODULE.to_string(),
                found: extension.kind().to_string(),
            });
        };

        let data = self
            .reader
            .emp_auction_data(ctx.at, lot.auction_module, lot.lot_id)
            .await?;
        let read = decode_lot_status(data.status)?;
        let status = next_status(ext.status, status_override, read);

        if status.is_settlement() && !ext.status.is_settlement() {
            ext.marginal_price = Some(to_decimal(data.marginal_price, lot.quote_decimals));
            ext.settlement = read_settlement(self.reader(), ctx, lot, &ext.min_filled).await?;
            info!(
                lot = %lot.id,
                status = ?status,
                partial_bid = ?ext.settlement.partial_bid_id,
                "EMP lot reached settlement"
            );
        }

        ext.status = status;
        ext.last_updated = ctx.provenance.clone();
        Ok(())
    }

    fn decode_bid_status(&self, code: u8) -> Result<BidStatus, ProjectionError> {
        match code {
            0 => Ok(BidStatus::Submitted),
            1 => Ok(BidStatus::Decrypted),
            2 => Ok(BidStatus::Claimed),
            code => Err(ProjectionError::UnknownStatus {
                module: MODULE,
                code,
            }),
        }
    }

    /// Sealed bids reveal nothing beyond the amount in until decryption.
    async fn on_bid_created(
        &self,
        _ctx: &EventContext,
        _lot: &AuctionLot,
        _extension: &ModuleLot,
        _bid: &mut Bid,
    ) -> Result<(), ProjectionError> {
        Ok(())
    }

    async fn on_bid_decrypted(
        &self,
        ctx: &EventContext,
        lot: &AuctionLot,
        bid: &mut Bid,
        amount_in: U256,
        amount_out: U256,
    ) -> Result<(), ProjectionError> {
        bid.amount_out = Some(to_decimal(amount_out, lot.base_decimals));
        bid.raw_amount_out = Some(amount_out);

        if let Some(price) = self.price_policy.price(lot, amount_in, amount_out)? {
            bid.submitted_price = Some(to_decimal(price, lot.quote_decimals));
            bid.raw_submitted_price = Some(price);
        }

        bid.last_updated = ctx.provenance.clone();
        Ok(())
    }
}
