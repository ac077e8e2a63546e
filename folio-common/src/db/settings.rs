//! Settings table (key-value store)
//!
//! The engine works against an in-memory [`MemoryStore`]; this module loads
//! the table into one at startup and writes its changes back afterwards.

use crate::storage::{MemoryStore, StoreChange};
use crate::Result;
use sqlx::SqlitePool;
use tracing::debug;

/// Create the settings table if it does not exist
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Snapshot every stored setting into a memory store
///
/// Rows with a NULL value are skipped.
pub async fn load_store(pool: &SqlitePool) -> Result<MemoryStore> {
    let rows: Vec<(String, Option<String>)> =
        sqlx::query_as("SELECT key, value FROM settings ORDER BY key")
            .fetch_all(pool)
            .await?;

    let store = MemoryStore::from_entries(
        rows.into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v))),
    );
    debug!("Loaded {} settings", store.len());
    Ok(store)
}

/// Write pending store changes back to the table
///
/// Returns the number of rows touched.
pub async fn flush_store(pool: &SqlitePool, store: &mut MemoryStore) -> Result<usize> {
    let changes = store.take_changes();
    if changes.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    for change in &changes {
        match change {
            StoreChange::Set { key, value } => {
                sqlx::query(
                    "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)",
                )
                .bind(key)
                .bind(value)
                .execute(&mut *tx)
                .await?;
            }
            StoreChange::Removed { key } => {
                sqlx::query("DELETE FROM settings WHERE key = ?")
                    .bind(key)
                    .execute(&mut *tx)
                    .await?;
            }
        }
    }
    tx.commit().await?;

    debug!("Flushed {} settings changes", changes.len());
    Ok(changes.len())
}

/// Read one setting directly from the table
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let row: Option<(Option<String>,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(row.and_then(|(value,)| value))
}
