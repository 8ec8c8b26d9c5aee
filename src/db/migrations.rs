//! Store initialisation: connection options and the ledger schema.

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Bumped whenever `schema.sql` changes shape.
pub const SCHEMA_VERSION: i64 = 1;

/// Open (creating if needed) the ledger store and apply the schema.
///
/// Foreign keys are enforced on every pooled connection so that bids,
/// extensions and derivative lots can never outlive their parent lot.
pub async fn init_db(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    apply_schema(&pool).await?;

    info!(path = db_path, version = SCHEMA_VERSION, "Ledger store ready");
    Ok(pool)
}

/// Apply every statement of `schema.sql` in one transaction and record the
/// schema version. Statements are `IF NOT EXISTS`, so reapplying is a no-op.
async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for statement in include_str!("schema.sql")
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    sqlx::query(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))
        .execute(&mut *tx)
        .await?;
    tx.commit().await
}

/// Schema version recorded in the store.
pub async fn schema_version(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let (version,): (i64,) = sqlx::query_as("PRAGMA user_version")
        .fetch_one(pool)
        .await?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("nested")
            .join("ledger.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        assert!(Path::new(&db_path).exists());
        (pool, temp_dir)
    }

    #[tokio::test]
    async fn test_schema_tables_exist() {
        let (pool, _temp) = open().await;

        for table in [
            "tokens",
            "auction_lots",
            "module_lots",
            "bids",
            "derivative_lots",
            "redemptions",
            "lot_infos",
            "event_records",
            "ingest_cursor",
        ] {
            let result: Option<(String,)> =
                sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name=?")
                    .bind(table)
                    .fetch_optional(&pool)
                    .await
                    .expect("query failed");
            assert!(result.is_some(), "missing table {}", table);
        }
        assert_eq!(schema_version(&pool).await.unwrap(), SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_reapplying_schema_keeps_rows() {
        let (pool, _temp) = open().await;
        sqlx::query("INSERT INTO ingest_cursor (chain, block_number, log_index) VALUES ('c', 1, 2)")
            .execute(&pool)
            .await
            .unwrap();

        apply_schema(&pool).await.expect("second apply failed");

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ingest_cursor")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_orphan_bid_rejected() {
        let (pool, _temp) = open().await;

        let result: (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        assert_eq!(result.0, 1);

        let orphan = sqlx::query(
            "INSERT INTO bids (id, lot, bid_id, bidder, doc) VALUES ('b', 'missing-lot', 1, '0x00', '{}')",
        )
        .execute(&pool)
        .await;
        assert!(orphan.is_err());
    }
}
