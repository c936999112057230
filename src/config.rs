//! Copyright (c) 2025, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了开关服务的配置结构和解析逻辑。

use crate::client::DeleteOrder;
use crate::error::{FlagError, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;

pub const CONFIG_VERSION: u32 = 1;

/// 顶层配置
///
/// 对应TOML配置文件，所有段落都有默认值
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub config_version: Option<u32>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub consistency: ConsistencyConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// HTTP服务配置
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听地址
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

/// 缓存后端类型
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Redis单机
    #[default]
    Redis,
    /// 进程内Moka缓存
    Memory,
}

/// 缓存层配置
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct CacheConfig {
    /// 缓存后端
    pub backend: CacheBackend,
    /// Redis配置
    pub redis: RedisConfig,
    /// 内存缓存配置
    pub memory: MemoryConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Redis,
            redis: RedisConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

/// Redis缓存配置
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct RedisConfig {
    /// 连接字符串
    pub connection_string: SecretString,
    /// Redis 密码（可选）
    pub password: Option<SecretString>,
    /// 是否启用 TLS
    pub enable_tls: bool,
    /// 连接超时时间（毫秒）
    pub connection_timeout_ms: u64,
    /// 命令执行超时时间（毫秒）
    pub command_timeout_ms: u64,
    /// 开关键前缀
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            connection_string: SecretString::from("redis://127.0.0.1:6379".to_string()),
            password: None,
            enable_tls: false,
            connection_timeout_ms: 5000,
            command_timeout_ms: 3000,
            key_prefix: "flag:".to_string(),
        }
    }
}

/// 内存缓存配置
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct MemoryConfig {
    /// 最大条目数
    pub max_capacity: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
        }
    }
}

/// 持久存储配置
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct StoreConfig {
    /// 数据库连接字符串（postgres:// / mysql:// / sqlite:）
    pub url: SecretString,
    pub max_connections: u32,
    pub min_connections: u32,
    /// 连接超时时间（毫秒）
    pub connect_timeout_ms: u64,
    /// 启动时自动建表
    pub auto_migrate: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: SecretString::from("sqlite:./data/flags.db".to_string()),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_ms: 5000,
            auto_migrate: true,
        }
    }
}

/// 一致性配置
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct ConsistencyConfig {
    /// 删除时两层的执行顺序
    pub delete_order: DeleteOrder,
}

/// 日志与链路追踪配置
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct TelemetryConfig {
    /// 未设置 RUST_LOG 时使用的日志过滤器
    pub log_level: String,
    /// 是否挂载 OpenTelemetry 层
    pub enable_opentelemetry: bool,
    /// 链路追踪中的服务名称
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            enable_opentelemetry: false,
            service_name: "flagcache".to_string(),
        }
    }
}

impl Config {
    /// 从TOML文件加载并验证配置
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            FlagError::Configuration(format!(
                "failed to parse {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        config.validate().map_err(FlagError::Configuration)?;
        Ok(config)
    }

    /// 验证配置
    ///
    /// 检查配置的有效性，确保值在合理范围内
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(version) = self.config_version {
            if version > CONFIG_VERSION {
                return Err(format!(
                    "Configuration version {} is not supported. Current version is {}.",
                    version, CONFIG_VERSION
                ));
            }
        }

        if self.server.bind.trim().is_empty() {
            return Err("server.bind cannot be empty".to_string());
        }

        match self.cache.backend {
            CacheBackend::Redis => {
                let redis = &self.cache.redis;
                if !(100..=30000).contains(&redis.connection_timeout_ms) {
                    return Err(
                        "cache.redis.connection_timeout_ms must be between 100 and 30000 ms"
                            .to_string(),
                    );
                }
                if !(100..=60000).contains(&redis.command_timeout_ms) {
                    return Err(
                        "cache.redis.command_timeout_ms must be between 100 and 60000 ms"
                            .to_string(),
                    );
                }
                if redis.key_prefix.contains('*') || redis.key_prefix.contains('?') {
                    return Err("cache.redis.key_prefix cannot contain glob characters".to_string());
                }
            }
            CacheBackend::Memory => {
                if self.cache.memory.max_capacity == 0 {
                    return Err("cache.memory.max_capacity cannot be zero".to_string());
                }
            }
        }

        if self.store.max_connections == 0 {
            return Err("store.max_connections cannot be zero".to_string());
        }
        if self.store.min_connections > self.store.max_connections {
            return Err(format!(
                "store.min_connections ({}) must be <= store.max_connections ({})",
                self.store.min_connections, self.store.max_connections
            ));
        }
        if !(100..=60000).contains(&self.store.connect_timeout_ms) {
            return Err("store.connect_timeout_ms must be between 100 and 60000 ms".to_string());
        }

        Ok(())
    }
}
