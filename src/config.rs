//! 配置系统
//! 从环境变量（以及可选的 TOML 文件）加载所有配置，使用 Secret 包装敏感信息

use config::{Config, ConfigError, Environment, File};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

/// 环境变量前缀，例如 `AUTHGATE_SECURITY__JWT_SECRET`
pub const ENV_PREFIX: &str = "AUTHGATE";

/// 令牌最长有效期（30 天）
const MAX_TOKEN_EXP_SECS: u64 = 30 * 24 * 3600;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，例如 "0.0.0.0:3000"
    pub addr: String,
    /// 优雅关闭超时时间（秒）
    pub graceful_shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库连接 URL（使用 Secret 包装，防止日志泄露）
    pub url: Secret<String>,
    /// 最大连接数
    pub max_connections: u32,
    /// 最小连接数
    pub min_connections: u32,
    /// 获取连接超时时间（秒）
    pub acquire_timeout_secs: u64,
    /// 空闲连接超时时间（秒）
    pub idle_timeout_secs: u64,
    /// 连接最大生命周期（秒）
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// JWT 签名密钥，没有内置默认值，签发令牌的服务必须显式配置
    pub jwt_secret: Option<Secret<String>>,
    /// 令牌有效期（秒），0 表示签发不过期的令牌
    pub token_exp_secs: u64,
    /// 密码最小长度
    pub password_min_length: usize,
    /// 密码必须包含大写字母
    pub password_require_uppercase: bool,
    /// 密码必须包含数字
    pub password_require_digit: bool,
    /// 密码必须包含特殊字符
    pub password_require_special: bool,
    /// Argon2 内存开销（KiB）
    pub argon2_memory_kib: u32,
    /// Argon2 迭代次数
    pub argon2_iterations: u32,
    /// Argon2 并行度
    pub argon2_parallelism: u32,
}

/// 固定用户目录中的一条记录（密码在启动时哈希，不以明文驻留在存储中）
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub password: Secret<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryConfig {
    /// 目录服务启动时注册的用户
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// 公共 API 目录地址
    pub source_url: String,
    /// 拉取超时时间（秒）
    pub fetch_timeout_secs: u64,
    /// 刷新间隔（秒），0 表示只在启动时拉取一次
    pub refresh_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EthereumConfig {
    /// JSON-RPC 节点地址（通常带有 API key，因此使用 Secret 包装）
    pub rpc_url: Option<Secret<String>>,
    /// 请求超时时间（秒）
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    pub catalog: CatalogConfig,
    pub ethereum: EthereumConfig,
}

impl AppConfig {
    /// 从环境变量加载配置
    ///
    /// `AUTHGATE_CONFIG` 可以指向一个可选的 TOML 文件（默认 `authgate`），
    /// 环境变量的优先级高于文件。
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        // 添加默认配置
        settings = settings
            .set_default("server.addr", "0.0.0.0:3000")?
            .set_default("server.graceful_shutdown_timeout_secs", 30)?
            .set_default("database.url", "sqlite://users.db")?
            .set_default("database.max_connections", 5)?
            .set_default("database.min_connections", 1)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.idle_timeout_secs", 600)?
            .set_default("database.max_lifetime_secs", 1800)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("security.token_exp_secs", 3600)?
            .set_default("security.password_min_length", 6)?
            .set_default("security.password_require_uppercase", false)?
            .set_default("security.password_require_digit", false)?
            .set_default("security.password_require_special", false)?
            .set_default("security.argon2_memory_kib", 19456)?
            .set_default("security.argon2_iterations", 2)?
            .set_default("security.argon2_parallelism", 1)?
            .set_default("catalog.source_url", "https://api.publicapis.org/entries")?
            .set_default("catalog.fetch_timeout_secs", 10)?
            .set_default("catalog.refresh_interval_secs", 3600)?
            .set_default("ethereum.request_timeout_secs", 10)?;

        // 可选的配置文件
        let file = std::env::var(format!("{}_CONFIG", ENV_PREFIX))
            .unwrap_or_else(|_| "authgate".to_string());
        settings = settings.add_source(File::with_name(&file).required(false));

        // 从环境变量加载配置（前缀为 AUTHGATE_）
        settings = settings.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = settings.build()?.try_deserialize()?;

        // 验证配置
        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 验证端口范围（0 表示随机端口）
        if let Some(port_str) = self.server.addr.split(':').next_back() {
            if let Ok(port) = port_str.parse::<u16>() {
                if port != 0 && port < 1024 {
                    return Err(ConfigError::Message("Server port should be >= 1024".to_string()));
                }
            }
        }

        // 验证日志级别
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        // 验证日志格式
        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        // 验证数据库连接池配置
        if self.database.max_connections < self.database.min_connections {
            return Err(ConfigError::Message(
                "max_connections must be >= min_connections".to_string(),
            ));
        }

        // 验证 JWT 密钥长度（至少 32 字符）
        if let Some(secret) = &self.security.jwt_secret {
            if secret.expose_secret().len() < 32 {
                return Err(ConfigError::Message(
                    "JWT secret must be at least 32 characters long".to_string(),
                ));
            }
        }

        // 验证令牌过期时间
        if self.security.token_exp_secs > MAX_TOKEN_EXP_SECS {
            return Err(ConfigError::Message(format!(
                "token_exp_secs must be <= {} (30 days), or 0 for non-expiring tokens",
                MAX_TOKEN_EXP_SECS
            )));
        }

        // 验证密码策略
        if self.security.password_min_length < 6 || self.security.password_min_length > 128 {
            return Err(ConfigError::Message(
                "password_min_length must be between 6 and 128".to_string(),
            ));
        }

        // 验证 Argon2 参数
        if let Err(e) = argon2::Params::new(
            self.security.argon2_memory_kib,
            self.security.argon2_iterations,
            self.security.argon2_parallelism,
            None,
        ) {
            return Err(ConfigError::Message(format!("Invalid Argon2 parameters: {}", e)));
        }

        if self.catalog.fetch_timeout_secs == 0 || self.ethereum.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "upstream timeouts must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
