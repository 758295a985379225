use std::env;

use crate::constants::{DEFAULT_TOKEN_BYTES, MAX_TOKEN_BYTES, MIN_TOKEN_BYTES};
use crate::security::HashingParams;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub allowed_origins: Vec<String>,
    pub environment: String,
    /// Length in bytes of newly issued access tokens
    pub token_bytes: usize,
    pub password_hashing: HashingParams,
    pub log_requests: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let database_url = env::var("DATABASE_URL")
            .or_else(|_| env::var("DEPLOY_DATABASE_URL"))
            .unwrap_or_else(|_| "sqlite://app.db".to_string());

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let token_bytes: usize = env::var("TOKEN_BYTES")
            .unwrap_or_else(|_| DEFAULT_TOKEN_BYTES.to_string())
            .parse()
            .map_err(|_| "Invalid TOKEN_BYTES")?;
        if !(MIN_TOKEN_BYTES..=MAX_TOKEN_BYTES).contains(&token_bytes) {
            return Err(format!(
                "TOKEN_BYTES must be between {} and {}",
                MIN_TOKEN_BYTES, MAX_TOKEN_BYTES
            ));
        }

        let defaults = HashingParams::default();
        let password_hashing = HashingParams {
            memory_kib: env::var("PASSWORD_HASH_MEMORY_KIB")
                .map(|v| v.parse().map_err(|_| "Invalid PASSWORD_HASH_MEMORY_KIB"))
                .unwrap_or(Ok(defaults.memory_kib))?,
            iterations: env::var("PASSWORD_HASH_ITERATIONS")
                .map(|v| v.parse().map_err(|_| "Invalid PASSWORD_HASH_ITERATIONS"))
                .unwrap_or(Ok(defaults.iterations))?,
            parallelism: env::var("PASSWORD_HASH_PARALLELISM")
                .map(|v| v.parse().map_err(|_| "Invalid PASSWORD_HASH_PARALLELISM"))
                .unwrap_or(Ok(defaults.parallelism))?,
        };

        let log_requests = env::var("LOG_REQUESTS")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(true);

        Ok(Config {
            server_host,
            server_port,
            database_url,
            allowed_origins,
            environment,
            token_bytes,
            password_hashing,
            log_requests,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_address() {
        let config = crate::test_support::test_config();
        assert_eq!(config.server_address(), "127.0.0.1:0");
    }
}
