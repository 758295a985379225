//! Account Directory
//!
//! Owns account records and the access tokens that authenticate them.
//! Passwords are stored only as Argon2id digests and tokens only as SHA-256
//! digests; plaintext values pass through here but are never persisted or
//! logged.

use chrono::Utc;
use sqlx::SqliteConnection;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::constants::{
    ERR_EMPTY_PASSWORD, ERR_INVALID_EMAIL, MAX_PERSON_NAME_LEN, MAX_TOKEN_BYTES, MIN_TOKEN_BYTES,
};
use crate::db::Db;
use crate::error::{AppError, Result};
use crate::models::Account;
use crate::security::{
    generate_account_id, generate_token, hash_password, token_digest, verify_password,
    HashingParams,
};

const ACCOUNT_COLUMNS: &str = "id, email, first_name, last_name, password_hash, created_at";

/// Hashed once into the decoy digest; never matches a real account
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// A freshly registered account and its first access token
#[derive(Clone)]
pub struct Registration {
    pub account: Account,
    /// Plaintext token; shown to the caller once and never stored
    pub token: String,
}

#[derive(Clone)]
pub struct AccountDirectory {
    db: Db,
    hashing: HashingParams,
    token_bytes: usize,
    /// Verified against when the email is unknown, so both sign-in failure
    /// paths cost one Argon2 verification
    decoy_digest: Arc<OnceCell<String>>,
    verifications: Arc<AtomicUsize>,
}

impl AccountDirectory {
    pub fn new(db: Db, hashing: HashingParams, token_bytes: usize) -> Self {
        Self {
            db,
            hashing,
            token_bytes,
            decoy_digest: Arc::new(OnceCell::new()),
            verifications: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Compute the decoy digest up front so the first unknown-email sign-in
    /// is not slower than the rest
    pub async fn warm_up(&self) -> Result<()> {
        self.decoy_digest().await.map(|_| ())
    }

    /// Length of tokens issued by `register`
    pub fn token_bytes(&self) -> usize {
        self.token_bytes
    }

    /// Register a new account
    ///
    /// Returns `DuplicateCredential` if the (normalized) email is taken.
    pub async fn register(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
        password: &str,
    ) -> Result<Registration> {
        let email = Account::normalize_email(email);
        if !Account::validate_email(&email) {
            return Err(AppError::Validation(ERR_INVALID_EMAIL.to_string()));
        }
        if !Account::validate_person_name(first_name) || !Account::validate_person_name(last_name) {
            return Err(AppError::Validation(format!(
                "First and last name must be at most {} characters",
                MAX_PERSON_NAME_LEN
            )));
        }
        if password.is_empty() {
            return Err(AppError::Validation(ERR_EMPTY_PASSWORD.to_string()));
        }

        let password = password.to_string();
        let params = self.hashing;
        let password_hash =
            tokio::task::spawn_blocking(move || hash_password(&password, params)).await??;

        let account = Account {
            id: generate_account_id(),
            email,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            password_hash,
            created_at: Utc::now(),
        };
        let token = generate_token(self.token_bytes);

        let mut tx = self.db.begin().await?;
        let inserted = sqlx::query(
            "INSERT INTO accounts (id, email, first_name, last_name, password_hash, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&account.id)
        .bind(&account.email)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.password_hash)
        .bind(account.created_at)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            if AppError::is_unique_violation(&e) {
                tracing::info!("Registration rejected: email already in use");
                return Err(AppError::DuplicateCredential);
            }
            return Err(e.into());
        }

        insert_token(&mut *tx, &account.id, &token).await?;
        tx.commit().await?;

        tracing::info!("New account registered: {}", account.id);
        Ok(Registration { account, token })
    }

    /// Check an email/password pair
    ///
    /// Unknown email and wrong password both yield `AuthFailure`.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Account> {
        let email = Account::normalize_email(email);

        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?"
        ))
        .bind(&email)
        .fetch_optional(&self.db)
        .await?;

        let Some(account) = account else {
            let decoy = self.decoy_digest().await?;
            self.verify(password, decoy).await?;
            tracing::warn!("Authentication failed");
            return Err(AppError::AuthFailure);
        };

        if !self.verify(password, account.password_hash.clone()).await? {
            tracing::warn!("Authentication failed");
            return Err(AppError::AuthFailure);
        }

        tracing::debug!("Account {} authenticated", account.id);
        Ok(account)
    }

    async fn verify(&self, password: &str, digest: String) -> Result<bool> {
        self.verifications.fetch_add(1, Ordering::Relaxed);
        let password = password.to_string();
        Ok(tokio::task::spawn_blocking(move || verify_password(&password, &digest)).await??)
    }

    async fn decoy_digest(&self) -> Result<String> {
        let params = self.hashing;
        let digest = self
            .decoy_digest
            .get_or_try_init(|| async move {
                tokio::task::spawn_blocking(move || hash_password(DECOY_PASSWORD, params))
                    .await
                    .map_err(AppError::from)
                    .and_then(|hashed| hashed)
            })
            .await?;
        Ok(digest.clone())
    }

    /// Password verifications run so far
    #[cfg(test)]
    fn verification_count(&self) -> usize {
        self.verifications.load(Ordering::Relaxed)
    }

    /// Issue a new token of `byte_length` random bytes, revoking all prior ones
    pub async fn issue_token(&self, account: &Account, byte_length: usize) -> Result<String> {
        if !(MIN_TOKEN_BYTES..=MAX_TOKEN_BYTES).contains(&byte_length) {
            return Err(AppError::Validation(format!(
                "Token length must be between {} and {} bytes",
                MIN_TOKEN_BYTES, MAX_TOKEN_BYTES
            )));
        }

        let token = generate_token(byte_length);

        let mut tx = self.db.begin().await?;
        let revoked = sqlx::query(
            "UPDATE access_tokens SET revoked_at = ? WHERE account_id = ? AND revoked_at IS NULL",
        )
        .bind(Utc::now())
        .bind(&account.id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        // Fails the transaction on the (vanishingly unlikely) digest collision
        insert_token(&mut *tx, &account.id, &token).await?;
        tx.commit().await?;

        tracing::info!(
            "Issued new token for account {} ({} revoked)",
            account.id,
            revoked
        );
        Ok(token)
    }

    /// Map a presented bearer token back to its account
    pub async fn resolve_by_token(&self, token: &str) -> Result<Account> {
        if token.is_empty() {
            return Err(AppError::AccountNotFound);
        }

        sqlx::query_as::<_, Account>(
            "SELECT a.id, a.email, a.first_name, a.last_name, a.password_hash, a.created_at \
             FROM access_tokens t JOIN accounts a ON a.id = t.account_id \
             WHERE t.token_digest = ? AND t.revoked_at IS NULL",
        )
        .bind(token_digest(token))
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::AccountNotFound)
    }

    /// Fetch an account by id
    pub async fn get(&self, id: &str) -> Result<Account> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::AccountNotFound)
    }
}

async fn insert_token(conn: &mut SqliteConnection, account_id: &str, token: &str) -> Result<()> {
    sqlx::query("INSERT INTO access_tokens (token_digest, account_id, created_at) VALUES (?, ?, ?)")
        .bind(token_digest(token))
        .bind(account_id)
        .bind(Utc::now())
        .execute(conn)
        .await?;
    Ok(())
}
