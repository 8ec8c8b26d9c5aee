use super::Repository;
use crate::domain::{AuctionLot, EventRecord, LotInfo, LotKey, ModuleLot, Token};

impl Repository {
    /// Load an auction lot by key.
    ///
    /// # Errors
    /// Returns an error if the query fails or the stored document is corrupt.
    pub async fn get_lot(&self, id: &LotKey) -> Result<Option<AuctionLot>, sqlx::Error> {
        self.fetch_doc("SELECT doc FROM auction_lots WHERE id = ?", id.as_str())
            .await
    }

    /// Load the module extension of a lot.
    pub async fn get_module_lot(&self, lot: &LotKey) -> Result<Option<ModuleLot>, sqlx::Error> {
        self.fetch_doc("SELECT doc FROM module_lots WHERE lot = ?", lot.as_str())
            .await
    }

    pub async fn get_token(&self, id: &str) -> Result<Option<Token>, sqlx::Error> {
        self.fetch_doc("SELECT doc FROM tokens WHERE id = ?", id).await
    }

    /// Load lot info by content hash.
    pub async fn get_lot_info(&self, hash: &str) -> Result<Option<LotInfo>, sqlx::Error> {
        self.fetch_doc("SELECT doc FROM lot_infos WHERE id = ?", hash)
            .await
    }

    pub async fn lot_infos_for(&self, lot: &LotKey) -> Result<Vec<LotInfo>, sqlx::Error> {
        self.fetch_docs(
            "SELECT doc FROM lot_infos WHERE lot = ? ORDER BY id ASC",
            lot.as_str(),
        )
        .await
    }

    /// Audit trail of a lot in event order.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn event_records_for_lot(
        &self,
        lot: &LotKey,
    ) -> Result<Vec<EventRecord>, sqlx::Error> {
        self.fetch_docs(
            r#"
            SELECT doc FROM event_records
            WHERE lot = ?
            ORDER BY block_number ASC, log_index ASC
            "#,
            lot.as_str(),
        )
        .await
    }
}
