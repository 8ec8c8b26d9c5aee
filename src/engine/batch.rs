//! Writes produced by projecting one event.

use crate::domain::{
    AuctionLot, Bid, DerivativeLot, EventRecord, LotInfo, ModuleLot, Redemption, Token,
};

/// All aggregate writes of a single event, applied in one transaction.
///
/// Each `put_*` replaces an earlier write for the same key, so a handler may
/// stage an aggregate more than once and only the last version is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionBatch {
    pub tokens: Vec<Token>,
    pub lots: Vec<AuctionLot>,
    pub module_lots: Vec<ModuleLot>,
    pub bids: Vec<Bid>,
    pub derivative_lots: Vec<DerivativeLot>,
    pub redemptions: Vec<Redemption>,
    pub lot_infos: Vec<LotInfo>,
    pub event_records: Vec<EventRecord>,
}

fn put<T>(items: &mut Vec<T>, item: T, same: impl Fn(&T, &T) -> bool) {
    match items.iter_mut().find(|existing| same(existing, &item)) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}

impl ProjectionBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_token(&mut self, token: Token) {
        put(&mut self.tokens, token, |a, b| a.id == b.id);
    }

    pub fn put_lot(&mut self, lot: AuctionLot) {
        put(&mut self.lots, lot, |a, b| a.id == b.id);
    }

    pub fn put_module_lot(&mut self, module_lot: ModuleLot) {
        put(&mut self.module_lots, module_lot, |a, b| a.lot() == b.lot());
    }

    pub fn put_bid(&mut self, bid: Bid) {
        put(&mut self.bids, bid, |a, b| a.id == b.id);
    }

    pub fn put_derivative_lot(&mut self, derivative_lot: DerivativeLot) {
        put(&mut self.derivative_lots, derivative_lot, |a, b| a.id == b.id);
    }

    pub fn put_redemption(&mut self, redemption: Redemption) {
        put(&mut self.redemptions, redemption, |a, b| a.id == b.id);
    }

    pub fn put_lot_info(&mut self, info: LotInfo) {
        put(&mut self.lot_infos, info, |a, b| a.id == b.id);
    }

    pub fn put_event_record(&mut self, record: EventRecord) {
        put(&mut self.event_records, record, |a, b| a.id == b.id);
    }

    /// True when the event produced no state change.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
            && self.lots.is_empty()
            && self.module_lots.is_empty()
            && self.bids.is_empty()
            && self.derivative_lots.is_empty()
            && self.redemptions.is_empty()
            && self.lot_infos.is_empty()
            && self.event_records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Decimal, LotKey};

    fn info(id: &str, name: &str) -> LotInfo {
        LotInfo {
            id: id.to_string(),
            lot: LotKey::from_raw("mainnet-0x00-1"),
            name: Some(name.to_string()),
            description: None,
            links: Default::default(),
        }
    }

    #[test]
    fn test_put_replaces_same_key() {
        let mut batch = ProjectionBatch::new();
        batch.put_lot_info(info("Qm1", "first"));
        batch.put_lot_info(info("Qm2", "other"));
        batch.put_lot_info(info("Qm1", "second"));

        assert_eq!(batch.lot_infos.len(), 2);
        assert_eq!(batch.lot_infos[0].name.as_deref(), Some("second"));
    }

    #[test]
    fn test_empty_batch() {
        let mut batch = ProjectionBatch::new();
        assert!(batch.is_empty());
        batch.put_token(Token {
            id: "mainnet-0x01".to_string(),
            chain: "mainnet".to_string(),
            address: Default::default(),
            name: "Token".to_string(),
            symbol: "TKN".to_string(),
            decimals: 18,
            total_supply: Decimal::zero(),
        });
        assert!(!batch.is_empty());
    }
}
