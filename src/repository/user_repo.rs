//! User repository (SQLite 数据库访问层)

use crate::{
    db::{self, HealthStatus},
    error::AppError,
    models::user::{Identity, NewCredential, StoredCredential},
    repository::CredentialStore,
};
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteCredentialStore {
    db: SqlitePool,
}

impl SqliteCredentialStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// 统计用户数量
    pub async fn count(&self) -> Result<i64, AppError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?;

        Ok(count.0)
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    /// 创建用户
    ///
    /// 只有一条 INSERT，重复由唯一约束拒绝，不做先查后插。
    async fn insert(&self, credential: NewCredential) -> Result<Identity, AppError> {
        let result = sqlx::query_as::<_, Identity>(
            r#"
            INSERT INTO users (username, email, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, username, email, created_at
            "#,
        )
        .bind(&credential.username)
        .bind(&credential.email)
        .bind(&credential.password_hash)
        .bind(chrono::Utc::now())
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(identity) => Ok(identity),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                tracing::debug!(constraint = ?e.constraint(), "Unique constraint rejected insert");
                Err(AppError::Conflict)
            }
            Err(e) => Err(AppError::Database(e)),
        }
    }

    /// 根据用户名查找用户
    async fn find_by_username(&self, username: &str) -> Result<Option<StoredCredential>, AppError> {
        let user = sqlx::query_as::<_, StoredCredential>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    async fn health_check(&self) -> HealthStatus {
        db::health_check(&self.db).await
    }
}
