//! Fixed-price batch auctions.

use super::{read_settlement, scaled_div, ModuleAdapter};
use crate::domain::{
    from_decimal, module::next_status, to_decimal, AuctionLot, Bid, BidStatus, FpbLot, FpbStatus,
    LotStatus, ModuleKind, ModuleLot, SettlementSummary, StatusOverride,
};
use crate::engine::context::EventContext;
use crate::engine::error::ProjectionError;
use crate::reader::ContractStateReader;
use alloy_primitives::U256;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

const MODULE: &str = "FPBA";

#[derive(Debug, Clone)]
pub struct FixedPriceBatchAdapter {
    reader: Arc<dyn ContractStateReader>,
}

impl FixedPriceBatchAdapter {
    pub fn new(reader: Arc<dyn ContractStateReader>) -> Self {
        Self { reader }
    }
}

fn decode_lot_status(code: u8) -> Result<FpbStatus, ProjectionError> {
    match code {
        0 => Ok(FpbStatus::Created),
        1 => Ok(FpbStatus::Settled),
        code => Err(ProjectionError::UnknownStatus {
            module: MODULE,
            code,
        }),
    }
}

fn expect_fpb<'a>(lot: &AuctionLot, extension: &'a ModuleLot) -> Result<&'a FpbLot, ProjectionError> {
    match extension {
        ModuleLot::FixedPriceBatch(ext) => Ok(ext),
        other => Err(ProjectionError::ModuleMismatch {
            lot: lot.id.clone(),
            expected: MODULE.to_string(),
            found: other.kind().to_string(),
        }),
    }
}

#[async_trait]
impl ModuleAdapter for FixedPriceBatchAdapter {
    fn kind(&self) -> ModuleKind {
        ModuleKind::FixedPriceBatch
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
            .fpb_auction_data(ctx.at, lot.auction_module, lot.lot_id)
            .await?;

        Ok(ModuleLot::FixedPriceBatch(FpbLot {
            lot: lot.id.clone(),
            status: decode_lot_status(data.status)?,
            price: to_decimal(data.price, lot.quote_decimals),
            min_filled: to_decimal(data.min_filled, lot.base_decimals),
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
        let ModuleLot::FixedPriceBatch(ext) = extension else {
            return Err(ProjectionError::ModuleMismatch {
                lot: lot.id.clone(),
                expected: MODULE.to_string(),
                found: extension.kind().to_string(),
            });
        };

        let data = self
            .reader
            .fpb_auction_data(ctx.at, lot.auction_module, lot.lot_id)
            .await?;
        let read = decode_lot_status(data.status)?;
        let status = next_status(ext.status, status_override, read);

        if status.is_settlement() && !ext.status.is_settlement() {
            ext.settlement = read_settlement(self.reader(), ctx, lot, &ext.min_filled).await?;
            info!(
                lot = %lot.id,
                status = ?status,
                partial_bid = ?ext.settlement.partial_bid_id,
                "FPB lot reached settlement"
            );
        }

        ext.status = status;
        ext.last_updated = ctx.provenance.clone();
        Ok(())
    }

    fn decode_bid_status(&self, code: u8) -> Result<BidStatus, ProjectionError> {
        match code {
            0 => Ok(BidStatus::Submitted),
            1 => Ok(BidStatus::Claimed),
            code => Err(ProjectionError::UnknownStatus {
                module: MODULE,
                code,
            }),
        }
    }

    /// The price is fixed, so the amount out is known as soon as the bid is
    /// placed.
    async fn on_bid_created(
        &self,
        _ctx: &EventContext,
        lot: &AuctionLot,
        extension: &ModuleLot,
        bid: &mut Bid,
    ) -> Result<(), ProjectionError> {
        let ext = expect_fpb(lot, extension)?;
        let price = from_decimal(&ext.price, lot.quote_decimals).ok_or_else(|| {
            ProjectionError::Arithmetic(format!("price {} is not a raw quote amount", ext.price))
        })?;

        if let Some(amount_out) = scaled_div(bid.raw_amount_in, lot.base_decimals, price)? {
            bid.amount_out = Some(to_decimal(amount_out, lot.base_decimals));
            bid.raw_amount_out = Some(amount_out);
        }
        bid.submitted_price = Some(ext.price.clone());
        bid.raw_submitted_price = Some(price);
        Ok(())
    }

    async fn on_bid_decrypted(
        &self,
        _ctx: &EventContext,
        _lot: &AuctionLot,
        _bid: &mut Bid,
        _amount_in: U256,
        _amount_out: U256,
    ) -> Result<(), ProjectionError> {
        Err(ProjectionError::Unsupported {
            event: "BidDecrypted",
            module: MODULE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Decimal;
    use crate::engine::testing::{bid_fixture, context_at, lot_fixture};
    use crate::reader::{FpbAuctionData, MockStateReader, PartialFill};

    fn fpb_data(status: u8) -> FpbAuctionData {
        FpbAuctionData {
            status,
            price: U256::from(2_500_000u64),
            min_filled: U256::from(10u64).pow(U256::from(18u8)),
        }
    }

    #[tokio::test]
    async fn test_bid_amount_out_known_at_creation() {
        let lot = lot_fixture(ModuleKind::FixedPriceBatch);
        let mock = Arc::new(MockStateReader::new().with_fpb_data(lot.lot_id, fpb_data(0)));
        let adapter = FixedPriceBatchAdapter::new(mock);
        let ctx = context_at(5);
        let ext = adapter.create_extension(&ctx, &lot).await.unwrap();

        let mut bid = bid_fixture(&lot.id, 1);
        bid.raw_amount_in = U256::from(5_000_000u64);
        adapter.on_bid_created(&ctx, &lot, &ext, &mut bid).await.unwrap();

        assert_eq!(bid.amount_out, Some(Decimal::from_str_canonical("2").unwrap()));
        assert_eq!(bid.submitted_price, Some(Decimal::from_str_canonical("2.5").unwrap()));
        assert_eq!(bid.raw_submitted_price, Some(U256::from(2_500_000u64)));
    }

    #[tokio::test]
    async fn test_fpb_status_mapping() {
        let adapter = FixedPriceBatchAdapter::new(Arc::new(MockStateReader::new()));
        assert_eq!(adapter.decode_bid_status(0).unwrap(), BidStatus::Submitted);
        assert_eq!(adapter.decode_bid_status(1).unwrap(), BidStatus::Claimed);
        assert!(adapter.decode_bid_status(2).is_err());
    }

    #[tokio::test]
    async fn test_abort_override_reads_settlement() {
        let lot = lot_fixture(ModuleKind::FixedPriceBatch);
        let mock = Arc::new(MockStateReader::new().with_fpb_data(lot.lot_id, fpb_data(0)));
        mock.set_partial_fill(
            lot.lot_id,
            PartialFill {
                has_partial_fill: false,
                bid_id: 0,
                refund: U256::ZERO,
                payout: U256::ZERO,
            },
        );
        let adapter = FixedPriceBatchAdapter::new(mock.clone());
        let ctx = context_at(9);
        let mut ext = adapter.create_extension(&ctx, &lot).await.unwrap();

        adapter
            .update_extension(&ctx, &lot, &mut ext, Some(StatusOverride::Aborted))
            .await
            .unwrap();
        mock.set_fpb_data(lot.lot_id, fpb_data(1));
        adapter
            .update_extension(&ctx, &lot, &mut ext, None)
            .await
            .unwrap();

        let ModuleLot::FixedPriceBatch(ext) = ext else {
            panic!("expected FPB extension");
        };
        assert_eq!(ext.status, FpbStatus::Aborted);
        assert_eq!(ext.settlement.has_partial_fill, Some(false));
        assert_eq!(ext.settlement.partial_bid_id, None);
        assert_eq!(ext.settlement.settlement_successful, Some(false));
    }

    #[tokio::test]
    async fn test_decrypt_is_unsupported() {
        let lot = lot_fixture(ModuleKind::FixedPriceBatch);
        let mut bid = bid_fixture(&lot.id, 1);
        let err = FixedPriceBatchAdapter::new(Arc::new(MockStateReader::new()))
            .on_bid_decrypted(&context_at(1), &lot, &mut bid, U256::ZERO, U256::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, ProjectionError::Unsupported { .. }));
    }
}
