//! Linear vesting derivative lots and their redemptions.

use super::context::EventContext;
use super::error::ProjectionError;
use crate::domain::{
    event::Redeemed, event_record_key, to_decimal, AuctionLot, DerivativeKind, DerivativeLot,
    DerivativeLotKey, LinearVestingParams, Redemption,
};
use crate::reader::{ContractStateReader, LotRouting};
use alloy_primitives::Address;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct LinearVestingAdapter {
    reader: Arc<dyn ContractStateReader>,
}

impl LinearVestingAdapter {
    pub fn new(reader: Arc<dyn ContractStateReader>) -> Self {
        Self { reader }
    }

    /// Decode the vesting window and resolve the derivative token id.
    ///
    /// The caller persists the record only when no lot has created it yet.
    ///
    /// The module address and token id come from authoritative reads: the
    /// module is shared, so the id cannot be derived locally.
    pub async fn create_derivative_lot(
        &self,
        ctx: &EventContext,
        lot: &AuctionLot,
        auction_house: Address,
        routing: &LotRouting,
    ) -> Result<DerivativeLot, ProjectionError> {
        let params = LinearVestingParams::decode(&routing.derivative_params)?;
        let kind = DerivativeKind::LinearVesting;

        let module = self
            .reader
            .module_for_keycode(ctx.at, auction_house, &kind.keycode())
            .await?;
        let token_id = self
            .reader
            .derivative_token_id(ctx.at, module, routing.base_token, &routing.derivative_params)
            .await?;

        let derivative = DerivativeLot {
            id: DerivativeLotKey::derive(&ctx.chain, &module, token_id),
            chain: ctx.chain.clone(),
            kind,
            module,
            token_id,
            lot: lot.id.clone(),
            underlying: routing.base_token,
            underlying_decimals: lot.base_decimals,
            start_timestamp: params.start,
            expiry_timestamp: params.expiry,
            wrapped: routing.wrap_derivative,
            created: ctx.provenance.clone(),
        };
        info!(
            lot = %lot.id,
            derivative = %derivative.id,
            start = params.start,
            expiry = params.expiry,
            "Resolved linear vesting lot"
        );
        Ok(derivative)
    }

    /// Build the redemption record; `remaining` is the holder's live balance.
    pub async fn redeem(
        &self,
        ctx: &EventContext,
        derivative: &DerivativeLot,
        event: &Redeemed,
    ) -> Result<Redemption, ProjectionError> {
        let remaining = self
            .reader
            .derivative_balance_of(ctx.at, derivative.module, event.user, derivative.token_id)
            .await?;

        Ok(Redemption {
            id: event_record_key(&ctx.provenance.transaction_hash, ctx.log_index, None, None),
            derivative_lot: derivative.id.clone(),
            user: event.user,
            redeemed: to_decimal(event.amount, derivative.underlying_decimals),
            remaining: to_decimal(remaining, derivative.underlying_decimals),
            provenance: ctx.provenance.clone(),
        })
    }
}
