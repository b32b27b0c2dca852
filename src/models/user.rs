//! User domain models

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// A registered identity. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Credential to be inserted; the password is already hashed
pub struct NewCredential {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
}

/// Credential row as stored
#[derive(Clone, sqlx::FromRow)]
pub struct StoredCredential {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<StoredCredential> for Identity {
    fn from(credential: StoredCredential) -> Self {
        Self {
            id: credential.id,
            username: credential.username,
            email: credential.email,
            created_at: credential.created_at,
        }
    }
}

impl fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredential")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}
