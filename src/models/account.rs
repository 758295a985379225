use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{MAX_EMAIL_LEN, MAX_PERSON_NAME_LEN};

/// Account row as stored in the `accounts` table
///
/// Carries the password digest, so it is never serialized directly.
/// Use [`Account::to_public_view`] for anything leaving the server.
#[derive(Clone, sqlx::FromRow)]
pub struct Account {
    /// UUID v4, immutable
    pub id: String,
    /// Lower-cased, trimmed email
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Argon2id PHC string
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("password_hash", &"[redacted]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Account model for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountView {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn to_public_view(&self) -> AccountView {
        AccountView {
            id: self.id.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            created_at: self.created_at,
        }
    }

    /// Canonical form used for storage and lookup
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Validate a normalized email: `local@domain`, both parts non-empty
    pub fn validate_email(email: &str) -> bool {
        if email.is_empty() || email.chars().count() > MAX_EMAIL_LEN {
            return false;
        }
        if email.chars().any(char::is_whitespace) {
            return false;
        }
        match email.split_once('@') {
            Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
            None => false,
        }
    }

    /// First and last names are optional but bounded
    pub fn validate_person_name(name: &str) -> bool {
        name.chars().count() <= MAX_PERSON_NAME_LEN
    }
}
