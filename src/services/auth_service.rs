//! 认证服务：注册、凭据校验、登录签发令牌

use crate::{
    auth::{jwt::JwtService, password::PasswordHasher},
    config::{SeedUser, SecurityConfig},
    db::HealthStatus,
    error::AppError,
    models::{auth::*, user::*},
    repository::CredentialStore,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use validator::Validate;

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<PasswordHasher>,
    jwt_service: Arc<JwtService>,
    security: SecurityConfig,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<PasswordHasher>,
        jwt_service: Arc<JwtService>,
        security: SecurityConfig,
    ) -> Self {
        Self {
            store,
            hasher,
            jwt_service,
            security,
        }
    }

    /// 注册新用户
    ///
    /// 校验失败时不会触及存储；重复的用户名或邮箱返回 `Conflict`。
    pub async fn register(&self, req: RegisterRequest) -> Result<Identity, AppError> {
        req.validate()?;
        PasswordHasher::validate_password_policy(&req.password, &self.security)?;

        // 哈希计算较重，放到阻塞线程池
        let hasher = self.hasher.clone();
        let password = req.password;
        let password_hash = run_blocking(move || hasher.hash(&password)).await??;

        let identity = self
            .store
            .insert(NewCredential {
                username: req.username,
                email: req.email,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = identity.id, username = %identity.username, "User registered");

        Ok(identity)
    }

    /// 校验用户名和密码
    ///
    /// 用户不存在时同样执行一次哈希校验，使两种失败的耗时一致。
    pub async fn verify(&self, username: &str, password: &str) -> Result<Identity, AppError> {
        let stored = self.store.find_by_username(username).await?;

        let hasher = self.hasher.clone();
        let password = password.to_string();

        match stored {
            None => {
                run_blocking(move || hasher.verify_dummy(&password)).await?;
                Err(AppError::UnknownUser)
            }
            Some(credential) => {
                let hash = credential.password_hash.clone();
                run_blocking(move || hasher.verify(&password, &hash)).await??;
                Ok(credential.into())
            }
        }
    }

    /// 用户登录
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        req.validate()?;

        let identity = match self.verify(&req.username, &req.password).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::info!(username = %req.username, reason = %e, "Login failed");
                return Err(e);
            }
        };

        let issued = self.jwt_service.issue(&identity.username)?;

        tracing::info!(user_id = identity.id, username = %identity.username, "Login succeeded");

        Ok(LoginResponse {
            token: issued.token,
            token_type: "Bearer",
            expires_in: issued.expires_in,
        })
    }

    /// 把配置中的固定用户写入存储（密码同样经过哈希）
    ///
    /// 配置里重复的用户名只保留第一条。
    pub async fn seed(&self, users: &[SeedUser]) -> Result<usize, AppError> {
        let mut inserted = 0;

        for user in users {
            let req = RegisterRequest {
                username: user.username.clone(),
                email: None,
                password: user.password.expose_secret().clone(),
            };

            match self.register(req).await {
                Ok(_) => inserted += 1,
                Err(AppError::Conflict) => {
                    tracing::warn!(username = %user.username, "Duplicate directory user skipped");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(inserted)
    }

    /// 存储健康检查
    pub async fn health_check(&self) -> HealthStatus {
        self.store.health_check().await
    }
}

/// 在阻塞线程池上执行 CPU 密集的操作
async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::internal(format!("Blocking task failed: {}", e)))
}
