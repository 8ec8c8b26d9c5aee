//! Per-auction-type lot extensions.

use super::decimal::Decimal;
use super::identity::LotKey;
use super::keycode::Keycode;
use super::primitives::Provenance;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of auction modules this ledger knows how to account for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    /// Sealed bids, decrypted after conclusion, settled at a marginal price.
    EncryptedMarginalPrice,
    /// Fixed price known at creation, bids filled in arrival order.
    FixedPriceBatch,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 2] = [
        ModuleKind::EncryptedMarginalPrice,
        ModuleKind::FixedPriceBatch,
    ];

    pub fn keycode(&self) -> Keycode {
        match self {
            ModuleKind::EncryptedMarginalPrice => Keycode::new("EMPA"),
            ModuleKind::FixedPriceBatch => Keycode::new("FPBA"),
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keycode())
    }
}

/// Lot status of an encrypted-marginal-price auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmpStatus {
    Created,
    Decrypted,
    Settled,
    Cancelled,
    Aborted,
}

/// Lot status of a fixed-price batch auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FpbStatus {
    Created,
    Settled,
    Cancelled,
    Aborted,
}

/// Status override applied on top of the module's own status read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOverride {
    Cancelled,
    Aborted,
}

/// Behaviour shared by both module status enums.
pub trait LotStatus: Copy + PartialEq {
    /// Cancelled and Aborted are sticky: later reads never replace them.
    fn is_sticky(&self) -> bool;
    /// Settled or Aborted: the states that trigger settlement reads.
    fn is_settlement(&self) -> bool;
    fn from_override(status: StatusOverride) -> Self;
}

impl LotStatus for EmpStatus {
    fn is_sticky(&self) -> bool {
        matches!(self, EmpStatus::Cancelled | EmpStatus::Aborted)
    }

    fn is_settlement(&self) -> bool {
        matches!(self, EmpStatus::Settled | EmpStatus::Aborted)
    }

    fn from_override(status: StatusOverride) -> Self {
        match status {
            StatusOverride::Cancelled => EmpStatus::Cancelled,
            StatusOverride::Aborted => EmpStatus::Aborted,
        }
    }
}

impl LotStatus for FpbStatus {
    fn is_sticky(&self) -> bool {
        matches!(self, FpbStatus::Cancelled | FpbStatus::Aborted)
    }

    fn is_settlement(&self) -> bool {
        matches!(self, FpbStatus::Settled | FpbStatus::Aborted)
    }

    fn from_override(status: StatusOverride) -> Self {
        match status {
            StatusOverride::Cancelled => FpbStatus::Cancelled,
            StatusOverride::Aborted => FpbStatus::Aborted,
        }
    }
}

/// Resolve the next status from the current one, an optional override and
/// the freshly read module status.
pub fn next_status<S: LotStatus>(current: S, status_override: Option<StatusOverride>, read: S) -> S {
    if let Some(status_override) = status_override {
        return S::from_override(status_override);
    }
    if current.is_sticky() {
        return current;
    }
    read
}

/// Settlement facts shared by both extensions, populated only once a
/// settlement-class status is reached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementSummary {
    pub has_partial_fill: Option<bool>,
    pub partial_bid_id: Option<u64>,
    pub settlement_successful: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpLot {
    pub lot: LotKey,
    pub status: EmpStatus,
    pub min_price: Decimal,
    pub min_filled: Decimal,
    pub min_bid_size: Decimal,
    pub marginal_price: Option<Decimal>,
    #[serde(flatten)]
    pub settlement: SettlementSummary,
    pub last_updated: Provenance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FpbLot {
    pub lot: LotKey,
    pub status: FpbStatus,
    pub price: Decimal,
    pub min_filled: Decimal,
    #[serde(flatten)]
    pub settlement: SettlementSummary,
    pub last_updated: Provenance,
}

/// One-to-one extension of an `AuctionLot`, variant by module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "module", rename_all = "snake_case")]
pub enum ModuleLot {
    EncryptedMarginalPrice(EmpLot),
    FixedPriceBatch(FpbLot),
}

impl ModuleLot {
    pub fn kind(&self) -> ModuleKind {
        match self {
            ModuleLot::EncryptedMarginalPrice(_) => ModuleKind::EncryptedMarginalPrice,
            ModuleLot::FixedPriceBatch(_) => ModuleKind::FixedPriceBatch,
        }
    }

    pub fn lot(&self) -> &LotKey {
        match self {
            ModuleLot::EncryptedMarginalPrice(ext) => &ext.lot,
            ModuleLot::FixedPriceBatch(ext) => &ext.lot,
        }
    }

    pub fn settlement(&self) -> &SettlementSummary {
        match self {
            ModuleLot::EncryptedMarginalPrice(ext) => &ext.settlement,
            ModuleLot::FixedPriceBatch(ext) => &ext.settlement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_always_wins() {
        let next = next_status(
            EmpStatus::Created,
            Some(StatusOverride::Cancelled),
            EmpStatus::Created,
        );
        assert_eq!(next, EmpStatus::Cancelled);
    }

    #[test]
    fn test_sticky_status_ignores_reads() {
        for read in [EmpStatus::Created, EmpStatus::Decrypted, EmpStatus::Settled] {
            assert_eq!(next_status(EmpStatus::Cancelled, None, read), EmpStatus::Cancelled);
            assert_eq!(next_status(EmpStatus::Aborted, None, read), EmpStatus::Aborted);
        }
        assert_eq!(
            next_status(FpbStatus::Aborted, None, FpbStatus::Settled),
            FpbStatus::Aborted
        );
    }

    #[test]
    fn test_non_sticky_status_follows_read() {
        assert_eq!(
            next_status(EmpStatus::Created, None, EmpStatus::Decrypted),
            EmpStatus::Decrypted
        );
        assert_eq!(
            next_status(FpbStatus::Created, None, FpbStatus::Settled),
            FpbStatus::Settled
        );
    }

    #[test]
    fn test_module_kind_keycodes() {
        assert_eq!(ModuleKind::EncryptedMarginalPrice.keycode().as_str(), "EMPA");
        assert_eq!(ModuleKind::FixedPriceBatch.keycode().as_str(), "FPBA");
    }
}
