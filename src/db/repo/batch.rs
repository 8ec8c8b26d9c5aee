use super::{encode_doc, to_i64, Repository};
use crate::domain::{hex_address, EventPosition};
use crate::engine::ProjectionBatch;
use tracing::debug;

impl Repository {
    /// Persist one event's writes and advance the chain cursor atomically.
    ///
    /// Aggregates are upserted whole. Derivative lots are written once;
    /// event records and redemptions are append-only, so a replayed event
    /// leaves them untouched.
    ///
    /// # Errors
    /// Returns an error if any statement fails; nothing is committed then.
    pub async fn apply_batch(
        &self,
        chain: &str,
        position: EventPosition,
        batch: &ProjectionBatch,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        for token in &batch.tokens {
            sqlx::query(
                r#"
                INSERT INTO tokens (id, chain, address, doc)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(id) DO NOTHING
                "#,
            )
            .bind(&token.id)
            .bind(&token.chain)
            .bind(hex_address(&token.address))
            .bind(encode_doc(token)?)
            .execute(&mut *tx)
            .await?;
        }

        for lot in &batch.lots {
            sqlx::query(
                r#"
                INSERT INTO auction_lots (id, chain, auction_house, lot_id, module, last_block, doc)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    last_block = excluded.last_block,
                    doc = excluded.doc
                "#,
            )
            .bind(lot.id.as_str())
            .bind(&lot.chain)
            .bind(hex_address(&lot.auction_house))
            .bind(to_i64(lot.lot_id)?)
            .bind(lot.module.to_string())
            .bind(to_i64(lot.last_updated.block_number)?)
            .bind(encode_doc(lot)?)
            .execute(&mut *tx)
            .await?;
        }

        for module_lot in &batch.module_lots {
            sqlx::query(
                r#"
                INSERT INTO module_lots (lot, module, doc)
                VALUES (?, ?, ?)
                ON CONFLICT(lot) DO UPDATE SET doc = excluded.doc
                "#,
            )
            .bind(module_lot.lot().as_str())
            .bind(module_lot.kind().to_string())
            .bind(encode_doc(module_lot)?)
            .execute(&mut *tx)
            .await?;
        }

        for derivative_lot in &batch.derivative_lots {
            sqlx::query(
                r#"
                INSERT INTO derivative_lots (id, chain, module, token_id, lot, doc)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO NOTHING
                "#,
            )
            .bind(derivative_lot.id.as_str())
            .bind(&derivative_lot.chain)
            .bind(hex_address(&derivative_lot.module))
            .bind(derivative_lot.token_id.to_string())
            .bind(derivative_lot.lot.as_str())
            .bind(encode_doc(derivative_lot)?)
            .execute(&mut *tx)
            .await?;
        }

        for bid in &batch.bids {
            sqlx::query(
                r#"
                INSERT INTO bids (id, lot, bid_id, bidder, doc)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET doc = excluded.doc
                "#,
            )
            .bind(bid.id.as_str())
            .bind(bid.lot.as_str())
            .bind(to_i64(bid.bid_id)?)
            .bind(hex_address(&bid.bidder))
            .bind(encode_doc(bid)?)
            .execute(&mut *tx)
            .await?;
        }

        for redemption in &batch.redemptions {
            sqlx::query(
                r#"
                INSERT INTO redemptions (id, derivative_lot, user, block_number, doc)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(id) DO NOTHING
                "#,
            )
            .bind(&redemption.id)
            .bind(redemption.derivative_lot.as_str())
            .bind(hex_address(&redemption.user))
            .bind(to_i64(redemption.provenance.block_number)?)
            .bind(encode_doc(redemption)?)
            .execute(&mut *tx)
            .await?;
        }

        for info in &batch.lot_infos {
            sqlx::query(
                r#"
                INSERT INTO lot_infos (id, lot, doc)
                VALUES (?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    lot = excluded.lot,
                    doc = excluded.doc
                "#,
            )
            .bind(&info.id)
            .bind(info.lot.as_str())
            .bind(encode_doc(info)?)
            .execute(&mut *tx)
            .await?;
        }

        for record in &batch.event_records {
            sqlx::query(
                r#"
                INSERT INTO event_records (id, chain, event_name, block_number, log_index, lot, bid, doc)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO NOTHING
                "#,
            )
            .bind(&record.id)
            .bind(&record.chain)
            .bind(&record.event_name)
            .bind(to_i64(record.block_number)?)
            .bind(to_i64(record.log_index)?)
            .bind(record.lot.as_ref().map(|lot| lot.as_str()))
            .bind(record.bid.as_ref().map(|bid| bid.as_str()))
            .bind(encode_doc(record)?)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO ingest_cursor (chain, block_number, log_index)
            VALUES (?, ?, ?)
            ON CONFLICT(chain) DO UPDATE SET
                block_number = excluded.block_number,
                log_index = excluded.log_index
            "#,
        )
        .bind(chain)
        .bind(to_i64(position.block_number)?)
        .bind(to_i64(position.log_index)?)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(
            chain,
            position = %position,
            lots = batch.lots.len(),
            bids = batch.bids.len(),
            "Applied projection batch"
        );
        Ok(())
    }
}
