//! # Folio Common Library
//!
//! Shared code for the portfolio engine and its driver:
//! - Content document model
//! - Key-value persistence (in-memory store and SQLite settings table)
//! - Configuration loading
//! - Clock formatting

pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod storage;
pub mod time;

pub use error::{Error, Result};
pub use storage::{KeyValueStore, MemoryStore};
