//! Credential store layer
//!
//! Two interchangeable backends implement [`CredentialStore`]: a SQLite table
//! and an in-memory map. Both hold only password hashes, and both guarantee
//! that at most one concurrent insert of the same username (or email) wins.

pub mod memory_repo;
pub mod user_repo;

pub use memory_repo::MemoryCredentialStore;
pub use user_repo::SqliteCredentialStore;

use crate::{
    db::HealthStatus,
    error::AppError,
    models::user::{Identity, NewCredential, StoredCredential},
};
use async_trait::async_trait;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Atomically insert a credential; a duplicate username or email yields `AppError::Conflict`
    async fn insert(&self, credential: NewCredential) -> Result<Identity, AppError>;

    /// Look up a credential by exact (case-sensitive) username
    async fn find_by_username(&self, username: &str) -> Result<Option<StoredCredential>, AppError>;

    async fn health_check(&self) -> HealthStatus {
        HealthStatus::Healthy
    }
}
