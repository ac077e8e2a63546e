//! folio-engine - headless portfolio driver
//!
//! Loads the content document, restores the visitor's settings from the
//! SQLite settings table, replays a command script against a session and
//! prints each `show` snapshot as JSON on stdout. Settings changed by the
//! script are written back when it finishes.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use folio_common::config::{resolve_root_folder, TomlConfig};
use folio_common::db::{init_database, settings};
use folio_common::time::millis_to_duration;
use folio_engine::loader::load_content;
use folio_engine::script::read_script;
use folio_engine::{ScriptRunner, Session, SessionOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for folio-engine
#[derive(Parser, Debug)]
#[command(name = "folio-engine")]
#[command(about = "Headless driver for the portfolio page engine")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_TIMESTAMP"), ")"))]
struct Args {
    /// Content document (file path or http(s) URL); overrides the config file
    #[arg(short, long, env = "FOLIO_CONTENT")]
    content: Option<String>,

    /// Config file (defaults to the per-user config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root folder holding the settings database
    #[arg(short, long, env = "FOLIO_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Settings database path; overrides the config file
    #[arg(long)]
    database: Option<PathBuf>,

    /// Command script to replay (stdin when omitted)
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Report a dark system colour scheme
    #[arg(long)]
    prefers_dark: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = TomlConfig::load_or_default(args.config.as_deref());

    init_tracing(&config)?;

    info!(
        "Starting folio-engine v{} built {}",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIMESTAMP")
    );

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &config);
    let db_path = args
        .database
        .clone()
        .unwrap_or_else(|| config.database_path(&root_folder));
    info!("Settings database: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to open settings database")?;
    let store = settings::load_store(&pool)
        .await
        .context("Failed to load settings")?;

    let source = args.content.clone().unwrap_or_else(|| config.content.clone());
    let doc = load_content(&source).await;

    let options = SessionOptions {
        prefers_dark: args.prefers_dark,
        search_debounce: millis_to_duration(config.search_debounce_ms),
        ..SessionOptions::default()
    };
    let mut session = Session::new(doc, store, options);

    let script = read_script(args.script.as_deref())
        .await
        .context("Failed to read command script")?;
    let snapshots = ScriptRunner::new(&mut session).run(&script);
    for snapshot in &snapshots {
        println!("{}", snapshot);
    }

    let written = settings::flush_store(&pool, session.store_mut())
        .await
        .context("Failed to save settings")?;
    info!("Saved {} settings changes", written);

    pool.close().await;
    Ok(())
}

fn init_tracing(config: &TomlConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("folio_engine={0},folio_common={0}", config.logging.level)));

    match &config.logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            // stdout carries the snapshots
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}
