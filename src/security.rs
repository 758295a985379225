use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::constants::DRONE_ID_BYTES;
use crate::error::{AppError, Result};

// =============================================================================
// Password Hashing
// =============================================================================

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl HashingParams {
    fn to_argon2(self) -> Result<Argon2<'static>> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| AppError::PasswordHash(format!("invalid argon2 params: {e}")))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for HashingParams {
    /// OWASP baseline for Argon2id
    fn default() -> Self {
        Self {
            memory_kib: 19456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Hash a password into a salted Argon2id PHC string
///
/// The result embeds algorithm, parameters and salt, so verification needs
/// nothing but the digest itself.
pub fn hash_password(password: &str, params: HashingParams) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = params.to_argon2()?;

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::PasswordHash(format!("hash password: {e}")))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored digest
///
/// Comparison is done by the argon2 crate in constant time.
pub fn verify_password(password: &str, digest: &str) -> Result<bool> {
    let parsed = PasswordHash::new(digest)
        .map_err(|e| AppError::PasswordHash(format!("parse digest: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

// =============================================================================
// Tokens and Identifiers
// =============================================================================

fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Generate a hex-encoded access token of `byte_length` random bytes
pub fn generate_token(byte_length: usize) -> String {
    hex::encode(random_bytes(byte_length))
}

/// SHA-256 digest of an access token, as stored in `access_tokens`
pub fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Fresh account id (UUID v4)
pub fn generate_account_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Fresh URL-safe drone id
pub fn generate_drone_id() -> String {
    URL_SAFE_NO_PAD.encode(random_bytes(DRONE_ID_BYTES))
}
