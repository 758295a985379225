//! Drone Inventory Server Library
//!
//! Accounts register and sign in through the [`directory::AccountDirectory`];
//! the drones they own live in the [`registry::DroneRegistry`]. Both are
//! plain service objects over one SQLite pool, carried in [`AppState`].

pub mod config;
pub mod constants;
pub mod db;
pub mod directory;
pub mod error;
pub mod models;
pub mod registry;
pub mod routes;
pub mod security;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use db::{create_pool, run_migrations, Db};
pub use directory::{AccountDirectory, Registration};
pub use error::{AppError, Result};
pub use registry::DroneRegistry;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Config,
    pub accounts: AccountDirectory,
    pub drones: DroneRegistry,
}

impl AppState {
    /// Create a new AppState with the given database and configuration
    pub fn new(db: Db, config: Config) -> Self {
        let accounts = AccountDirectory::new(db.clone(), config.password_hashing, config.token_bytes);
        let drones = DroneRegistry::new(db.clone());
        Self {
            db,
            config,
            accounts,
            drones,
        }
    }
}
