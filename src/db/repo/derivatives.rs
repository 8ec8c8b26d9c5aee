use super::Repository;
use crate::domain::{DerivativeLot, DerivativeLotKey, Redemption};

impl Repository {
    pub async fn get_derivative_lot(
        &self,
        id: &DerivativeLotKey,
    ) -> Result<Option<DerivativeLot>, sqlx::Error> {
        self.fetch_doc("SELECT doc FROM derivative_lots WHERE id = ?", id.as_str())
            .await
    }

    /// Redemptions of a derivative lot in block order.
    pub async fn redemptions_for(
        &self,
        derivative_lot: &DerivativeLotKey,
    ) -> Result<Vec<Redemption>, sqlx::Error> {
        self.fetch_docs(
            r#"
            SELECT doc FROM redemptions
            WHERE derivative_lot = ?
            ORDER BY block_number ASC, rowid ASC
            "#,
            derivative_lot.as_str(),
        )
        .await
    }
}
