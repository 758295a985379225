//! Shared fixtures for unit tests.

use tempfile::TempDir;

use crate::config::Config;
use crate::db::{create_pool, run_migrations, Db};
use crate::security::HashingParams;

/// Configuration with cheap password hashing so tests stay fast
pub fn test_config() -> Config {
    Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        database_url: String::new(),
        allowed_origins: vec!["http://localhost:5173".to_string()],
        environment: "test".to_string(),
        token_bytes: 24,
        password_hashing: HashingParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
        log_requests: false,
    }
}

/// Migrated SQLite database in a fresh temp dir; keep the `TempDir` alive
pub async fn test_db() -> (TempDir, Db) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("test.db").display());
    let db = create_pool(&url).await.expect("Failed to create test database");
    run_migrations(&db).await.expect("Failed to run migrations");
    (dir, db)
}
