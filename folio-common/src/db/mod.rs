//! Settings database access
//!
//! A single SQLite file holds the `settings` key-value table that backs the
//! visitor's persisted state between sessions.

pub mod settings;

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open (creating if needed) the settings database and its schema
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new settings database: {}", db_path.display());
    } else {
        info!("Opened existing settings database: {}", db_path.display());
    }

    settings::create_settings_table(&pool).await?;
    Ok(pool)
}
