//! csv-store - Upload CSV files and convert them on demand
//!
//! This crate provides a small browser-facing web application with:
//! - redb embedded database holding each upload's bytes and decoded text
//! - CSV to Parquet conversion through Arrow
//! - HTML table previews of stored CSVs

pub mod api;
pub mod config;
pub mod convert;
pub mod storage;
#[cfg(test)]
pub mod testutil;

use config::Config;
use storage::Database;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
}
