//! In-memory credential store
//!
//! Used by the fixed-directory service and by tests. The uniqueness check and
//! the insert happen under one write lock, which gives the same at-most-one-winner
//! behaviour as the SQLite unique constraints.

use crate::{
    error::AppError,
    models::user::{Identity, NewCredential, StoredCredential},
    repository::CredentialStore,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    by_username: HashMap<String, StoredCredential>,
    emails: HashSet<String>,
    next_id: i64,
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Inner>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_username.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn insert(&self, credential: NewCredential) -> Result<Identity, AppError> {
        let mut inner = self.inner.write().await;

        if inner.by_username.contains_key(&credential.username) {
            return Err(AppError::Conflict);
        }
        if let Some(email) = &credential.email {
            if inner.emails.contains(email) {
                return Err(AppError::Conflict);
            }
        }

        inner.next_id += 1;
        let stored = StoredCredential {
            id: inner.next_id,
            username: credential.username,
            email: credential.email,
            password_hash: credential.password_hash,
            created_at: chrono::Utc::now(),
        };

        if let Some(email) = &stored.email {
            inner.emails.insert(email.clone());
        }
        inner
            .by_username
            .insert(stored.username.clone(), stored.clone());

        Ok(stored.into())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<StoredCredential>, AppError> {
        Ok(self.inner.read().await.by_username.get(username).cloned())
    }
}
