//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by domain:
//! - `lots.rs` - Lots, module extensions, tokens, lot info and the event log
//! - `bids.rs` - Bid reads
//! - `derivatives.rs` - Derivative lots and redemptions
//! - `batch.rs` - Atomic application of one event's writes and the cursor

mod batch;
mod bids;
mod derivatives;
mod lots;

use crate::domain::EventPosition;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

/// Repository for database operations.
///
/// Aggregates are stored as a JSON document per key, next to the columns
/// needed to index them.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Last accepted event position for a chain.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_cursor(&self, chain: &str) -> Result<Option<EventPosition>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT block_number, log_index
            FROM ingest_cursor
            WHERE chain = ?
            "#,
        )
        .bind(chain)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let block_number: i64 = row.get("block_number");
            let log_index: i64 = row.get("log_index");
            Ok(EventPosition::new(from_i64(block_number)?, from_i64(log_index)?))
        })
        .transpose()
    }

    async fn fetch_doc<T: DeserializeOwned>(
        &self,
        sql: &str,
        key: &str,
    ) -> Result<Option<T>, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as(sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|(doc,)| decode_doc(&doc)).transpose()
    }

    async fn fetch_docs<T: DeserializeOwned>(
        &self,
        sql: &str,
        key: &str,
    ) -> Result<Vec<T>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(sql)
            .bind(key)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(|(doc,)| decode_doc(doc)).collect()
    }
}

pub(crate) fn encode_doc<T: Serialize>(value: &T) -> Result<String, sqlx::Error> {
    serde_json::to_string(value)
        .map_err(|e| sqlx::Error::Protocol(format!("failed to encode document: {}", e)))
}

pub(crate) fn decode_doc<T: DeserializeOwned>(doc: &str) -> Result<T, sqlx::Error> {
    serde_json::from_str(doc).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

pub(crate) fn to_i64(value: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(value)
        .map_err(|_| sqlx::Error::Protocol(format!("integer {} exceeds SQLite range", value)))
}

pub(crate) fn from_i64(value: i64) -> Result<u64, sqlx::Error> {
    u64::try_from(value).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_range_helpers() {
        assert_eq!(to_i64(42).unwrap(), 42);
        assert!(to_i64(u64::MAX).is_err());
        assert_eq!(from_i64(7).unwrap(), 7);
        assert!(from_i64(-1).is_err());
    }

    #[test]
    fn test_decode_doc_rejects_garbage() {
        let result: Result<EventPosition, _> = decode_doc("not json");
        assert!(matches!(result, Err(sqlx::Error::Decode(_))));
    }
}
