//! Auction module adapters.
//!
//! Each auction module (keycode) has its own status encoding and settlement
//! math. A lot records its `ModuleKind` once at creation; every later event
//! dispatches through the registry by that tag.

use super::context::EventContext;
use super::error::ProjectionError;
use crate::domain::{
    to_decimal, AuctionLot, Bid, BidOutcome, BidStatus, Keycode, ModuleKind, ModuleLot,
    SettlementSummary, StatusOverride,
};
use crate::reader::{BidClaim, ContractStateReader};
use alloy_primitives::U256;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub mod emp;
pub mod fpb;

pub use emp::EncryptedMarginalPriceAdapter;
pub use fpb::FixedPriceBatchAdapter;

/// Per-module accounting behind a common interface.
#[async_trait]
pub trait ModuleAdapter: Send + Sync + fmt::Debug {
    fn kind(&self) -> ModuleKind;

    fn reader(&self) -> &dyn ContractStateReader;

    /// Build the extension record from the module's auction data.
    async fn create_extension(
        &self,
        ctx: &EventContext,
        lot: &AuctionLot,
    ) -> Result<ModuleLot, ProjectionError>;

    /// Re-read module status and apply it under the override/sticky rules.
    /// Settlement fields are read on the transition into a settlement status.
    async fn update_extension(
        &self,
        ctx: &EventContext,
        lot: &AuctionLot,
        extension: &mut ModuleLot,
        status_override: Option<StatusOverride>,
    ) -> Result<(), ProjectionError>;

    /// Map the module's raw bid status code.
    fn decode_bid_status(&self, code: u8) -> Result<BidStatus, ProjectionError>;

    /// Fill module-derived fields of a freshly placed bid.
    async fn on_bid_created(
        &self,
        ctx: &EventContext,
        lot: &AuctionLot,
        extension: &ModuleLot,
        bid: &mut Bid,
    ) -> Result<(), ProjectionError>;

    async fn on_bid_decrypted(
        &self,
        ctx: &EventContext,
        lot: &AuctionLot,
        bid: &mut Bid,
        amount_in: U256,
        amount_out: U256,
    ) -> Result<(), ProjectionError>;

    /// Re-read the bid and overwrite its status.
    async fn update_bid_status(
        &self,
        ctx: &EventContext,
        lot: &AuctionLot,
        bid: &mut Bid,
    ) -> Result<(), ProjectionError> {
        let module_bid = self
            .reader()
            .bid(ctx.at, lot.auction_module, self.kind(), lot.lot_id, bid.bid_id)
            .await?;
        bid.status = self.decode_bid_status(module_bid.status)?;
        bid.last_updated = ctx.provenance.clone();
        Ok(())
    }
}

/// Rounding applied to a truncated submitted price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmittedPriceRounding {
    /// Add one unit of the quote token after truncating.
    #[default]
    RoundUpOneUnit,
    Truncate,
}

impl SubmittedPriceRounding {
    pub fn apply(&self, truncated: U256) -> U256 {
        match self {
            SubmittedPriceRounding::RoundUpOneUnit => truncated.saturating_add(U256::from(1u8)),
            SubmittedPriceRounding::Truncate => truncated,
        }
    }
}

impl FromStr for SubmittedPriceRounding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "round_up_one" => Ok(SubmittedPriceRounding::RoundUpOneUnit),
            "truncate" => Ok(SubmittedPriceRounding::Truncate),
            other => Err(format!("unknown rounding policy: {}", other)),
        }
    }
}

/// Power of ten the bid's amount in is scaled by before dividing by its
/// amount out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmittedPriceScale {
    /// `amountIn * 10^quoteDecimals / amountOut`.
    #[default]
    QuoteDecimals,
    /// `amountIn * 10^baseDecimals / amountOut`, quote units per whole base
    /// token.
    BaseDecimals,
}

impl SubmittedPriceScale {
    pub fn decimals(&self, lot: &AuctionLot) -> u8 {
        match self {
            SubmittedPriceScale::QuoteDecimals => lot.quote_decimals,
            SubmittedPriceScale::BaseDecimals => lot.base_decimals,
        }
    }
}

impl FromStr for SubmittedPriceScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quote_decimals" => Ok(SubmittedPriceScale::QuoteDecimals),
            "base_decimals" => Ok(SubmittedPriceScale::BaseDecimals),
            other => Err(format!("unknown price scale: {}", other)),
        }
    }
}

/// How a decrypted bid's submitted price is derived from its amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubmittedPricePolicy {
    pub rounding: SubmittedPriceRounding,
    pub scale: SubmittedPriceScale,
}

impl SubmittedPricePolicy {
    pub fn new(rounding: SubmittedPriceRounding, scale: SubmittedPriceScale) -> Self {
        Self { rounding, scale }
    }

    /// Raw submitted price in quote units, `None` when nothing was bought.
    ///
    /// # Errors
    /// Fails when the scaled amount in overflows 256 bits.
    pub fn price(
        &self,
        lot: &AuctionLot,
        amount_in: U256,
        amount_out: U256,
    ) -> Result<Option<U256>, ProjectionError> {
        Ok(scaled_div(amount_in, self.scale.decimals(lot), amount_out)?
            .map(|truncated| self.rounding.apply(truncated)))
    }
}

/// `refund>0 && payout>0` is a partial fill, `payout>0` a win, anything
/// else a loss.
pub fn classify_bid_outcome(refund: U256, payout: U256) -> BidOutcome {
    match (refund.is_zero(), payout.is_zero()) {
        (false, false) => BidOutcome::WonPartialFill,
        (true, false) => BidOutcome::Won,
        (_, true) => BidOutcome::Lost,
    }
}

/// Write the settlement accounting of a bid from its authoritative claim.
///
/// Paid and refunded amounts are quote-token amounts, the payout is in the
/// base token.
pub fn update_bid_settlement(bid: &mut Bid, claim: &BidClaim, lot: &AuctionLot) {
    let refunded = to_decimal(claim.refund, lot.quote_decimals);
    let paid = to_decimal(claim.paid, lot.quote_decimals);

    bid.settled_amount_in = Some(paid - refunded.clone());
    bid.settled_amount_in_refunded = Some(refunded);
    bid.settled_amount_out = Some(to_decimal(claim.payout, lot.base_decimals));
    bid.outcome = Some(classify_bid_outcome(claim.refund, claim.payout));
}

/// Read the partial-fill view once a lot reaches a settlement status.
pub(crate) async fn read_settlement(
    reader: &dyn ContractStateReader,
    ctx: &EventContext,
    lot: &AuctionLot,
    min_filled: &crate::domain::Decimal,
) -> Result<SettlementSummary, ProjectionError> {
    let fill = reader
        .partial_fill(ctx.at, lot.auction_module, lot.lot_id)
        .await?;
    Ok(SettlementSummary {
        has_partial_fill: Some(fill.has_partial_fill),
        partial_bid_id: fill.has_partial_fill.then_some(fill.bid_id),
        settlement_successful: Some(lot.sold >= *min_filled),
    })
}

/// `a * 10^decimals / b`, truncating. `None` when `b` is zero.
pub(crate) fn scaled_div(a: U256, decimals: u8, b: U256) -> Result<Option<U256>, ProjectionError> {
    if b.is_zero() {
        return Ok(None);
    }
    let scale = U256::from(10u8).pow(U256::from(decimals));
    let numerator = a.checked_mul(scale).ok_or_else(|| {
        ProjectionError::Arithmetic(format!("{} * 10^{} overflows", a, decimals))
    })?;
    Ok(Some(numerator / b))
}

/// Keycode to adapter dispatch table.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    keycodes: HashMap<Keycode, ModuleKind>,
    adapters: HashMap<ModuleKind, Arc<dyn ModuleAdapter>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the EMP and FPB adapters.
    pub fn with_defaults(
        reader: Arc<dyn ContractStateReader>,
        price_policy: SubmittedPricePolicy,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(EncryptedMarginalPriceAdapter::new(
            reader.clone(),
            price_policy,
        )));
        registry.register(Arc::new(FixedPriceBatchAdapter::new(reader)));
        registry
    }

    pub fn register(&mut self, adapter: Arc<dyn ModuleAdapter>) {
        let kind = adapter.kind();
        self.keycodes.insert(kind.keycode(), kind);
        self.adapters.insert(kind, adapter);
    }

    /// Resolve a keycode to a module tag.
    ///
    /// # Errors
    /// An unknown keycode is a contract violation.
    pub fn resolve(&self, keycode: &Keycode) -> Result<ModuleKind, ProjectionError> {
        self.keycodes
            .get(keycode)
            .copied()
            .ok_or_else(|| ProjectionError::UnknownKeycode(keycode.to_string()))
    }

    pub fn adapter(&self, kind: ModuleKind) -> Result<&dyn ModuleAdapter, ProjectionError> {
        self.adapters
            .get(&kind)
            .map(|adapter| adapter.as_ref())
            .ok_or_else(|| ProjectionError::UnknownKeycode(kind.keycode().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Decimal;
    use crate::reader::MockStateReader;

    #[test]
    fn test_classify_outcome_is_total_and_exclusive() {
        let values = [U256::ZERO, U256::from(1u8), U256::from(1_000u64), U256::MAX];
        for refund in values {
            for payout in values {
                let outcome = classify_bid_outcome(refund, payout);
                let partial = !refund.is_zero() && !payout.is_zero();
                assert_eq!(outcome == BidOutcome::WonPartialFill, partial);
                if payout.is_zero() {
                    assert_eq!(outcome, BidOutcome::Lost);
                } else if refund.is_zero() {
                    assert_eq!(outcome, BidOutcome::Won);
                }
            }
        }
    }

    #[test]
    fn test_rounding_policy() {
        assert_eq!(
            SubmittedPriceRounding::RoundUpOneUnit.apply(U256::from(10u8)),
            U256::from(11u8)
        );
        assert_eq!(
            SubmittedPriceRounding::Truncate.apply(U256::from(10u8)),
            U256::from(10u8)
        );
        assert_eq!(
            "truncate".parse::<SubmittedPriceRounding>(),
            Ok(SubmittedPriceRounding::Truncate)
        );
        assert!("nearest".parse::<SubmittedPriceRounding>().is_err());
    }

    #[test]
    fn test_default_price_policy_scales_by_quote_decimals() {
        // 18-decimal base, 6-decimal quote
        let lot = crate::engine::testing::lot_fixture(ModuleKind::EncryptedMarginalPrice);
        let policy = SubmittedPricePolicy::default();
        assert_eq!(policy.scale, SubmittedPriceScale::QuoteDecimals);
        assert_eq!(policy.rounding, SubmittedPriceRounding::RoundUpOneUnit);

        let amount_in = U256::from(2_000_000u64);
        let one_base = U256::from(10u64).pow(U256::from(18u8));

        let truncate = SubmittedPricePolicy::new(
            SubmittedPriceRounding::Truncate,
            SubmittedPriceScale::QuoteDecimals,
        );
        assert_eq!(truncate.price(&lot, amount_in, one_base).unwrap(), Some(U256::ZERO));
        assert_eq!(
            truncate.price(&lot, amount_in, U256::from(1_000_000u64)).unwrap(),
            Some(U256::from(2_000_000u64))
        );
        assert_eq!(policy.price(&lot, amount_in, one_base).unwrap(), Some(U256::from(1u8)));

        let per_base = SubmittedPricePolicy::new(
            SubmittedPriceRounding::Truncate,
            SubmittedPriceScale::BaseDecimals,
        );
        assert_eq!(
            per_base.price(&lot, amount_in, one_base).unwrap(),
            Some(U256::from(2_000_000u64))
        );
        assert_eq!(policy.price(&lot, amount_in, U256::ZERO).unwrap(), None);

        assert_eq!(
            "base_decimals".parse::<SubmittedPriceScale>(),
            Ok(SubmittedPriceScale::BaseDecimals)
        );
        assert!("whole_tokens".parse::<SubmittedPriceScale>().is_err());
    }

    #[test]
    fn test_scaled_div() {
        assert_eq!(
            scaled_div(U256::from(3u8), 2, U256::from(2u8)).unwrap(),
            Some(U256::from(150u8))
        );
        assert_eq!(scaled_div(U256::from(1u8), 18, U256::ZERO).unwrap(), None);
        assert!(scaled_div(U256::MAX, 1, U256::from(1u8)).is_err());
    }

    #[test]
    fn test_registry_resolves_default_keycodes() {
        let reader = Arc::new(MockStateReader::new());
        let registry = ModuleRegistry::with_defaults(reader, SubmittedPricePolicy::default());

        assert_eq!(
            registry.resolve(&Keycode::new("EMPA")).unwrap(),
            ModuleKind::EncryptedMarginalPrice
        );
        assert_eq!(
            registry.resolve(&Keycode::new("FPBA")).unwrap(),
            ModuleKind::FixedPriceBatch
        );
        assert!(matches!(
            registry.resolve(&Keycode::new("GDA")),
            Err(ProjectionError::UnknownKeycode(code)) if code == "GDA"
        ));
        assert_eq!(
            registry
                .adapter(ModuleKind::FixedPriceBatch)
                .unwrap()
                .kind(),
            ModuleKind::FixedPriceBatch
        );
    }

    #[test]
    fn test_update_bid_settlement_conserves_paid() {
        let lot = crate::engine::testing::lot_fixture(ModuleKind::EncryptedMarginalPrice);
        let mut bid = crate::engine::testing::bid_fixture(&lot.id, 1);
        let claim = BidClaim {
            bidder: bid.bidder,
            referrer: Default::default(),
            paid: U256::from(2_000_000u64),
            payout: U256::from(5u64) * U256::from(10u64).pow(U256::from(17u8)),
            refund: U256::from(500_000u64),
        };

        update_bid_settlement(&mut bid, &claim, &lot);

        let settled_in = bid.settled_amount_in.clone().unwrap();
        let refunded = bid.settled_amount_in_refunded.clone().unwrap();
        assert_eq!(settled_in.clone() + refunded, to_decimal(claim.paid, 6));
        assert_eq!(settled_in, Decimal::from_str_canonical("1.5").unwrap());
        assert_eq!(
            bid.settled_amount_out,
            Some(Decimal::from_str_canonical("0.5").unwrap())
        );
        assert_eq!(bid.outcome, Some(BidOutcome::WonPartialFill));
    }
}
