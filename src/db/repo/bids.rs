use super::Repository;
use crate::domain::{Bid, BidKey, LotKey};

impl Repository {
    pub async fn get_bid(&self, id: &BidKey) -> Result<Option<Bid>, sqlx::Error> {
        self.fetch_doc("SELECT doc FROM bids WHERE id = ?", id.as_str())
            .await
    }

    /// All bids of a lot ordered by bid id.
    ///
    /// The reverse relation is derived from the `lot` column, not stored on
    /// the lot.
    ///
    /// # Errors
    /// Returns an error if the query fails or a stored document is corrupt.
    pub async fn bids_for_lot(&self, lot: &LotKey) -> Result<Vec<Bid>, sqlx::Error> {
        self.fetch_docs(
            "SELECT doc FROM bids WHERE lot = ? ORDER BY bid_id ASC",
            lot.as_str(),
        )
        .await
    }
}
