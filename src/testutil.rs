//! Shared test helpers for router tests.

use std::sync::Arc;

use crate::config::{Config, ServerConfig};
use crate::storage::Database;
use crate::AppState;

/// Create a test AppState backed by a temporary database.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    let data_dir = temp_dir.path().join("data");

    let config = Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            data_dir: data_dir.to_string_lossy().to_string(),
        },
        max_upload_size: 1024 * 1024, // 1MB for tests
    };

    let db = Database::open(&data_dir).expect("Failed to open test database");

    Arc::new(AppState { config, db })
}
