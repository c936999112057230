//! Copyright (c) 2025, Kirky.X
//!
//! MIT License
//!
//! 该模块负责建立Redis连接。

use crate::config::RedisConfig;
use crate::error::{FlagError, Result, Tier};
use crate::utils::redaction::redact_connection_string;
use redis::{aio::ConnectionManager, Client, IntoConnectionInfo};
use secrecy::ExposeSecret;
use tokio::time::{timeout, Duration};
use tracing::info;

/// 按配置拼出最终的连接字符串
///
/// 启用TLS时把 `redis://` 改写为 `rediss://`
pub fn resolve_connection_string(config: &RedisConfig) -> String {
    let raw = config.connection_string.expose_secret();
    if config.enable_tls && !raw.starts_with("rediss://") {
        raw.replace("redis://", "rediss://")
    } else {
        raw.to_string()
    }
}

/// 创建单机模式的连接管理器
///
/// 连接管理器会在连接断开后自动重连，初次握手受 `connection_timeout_ms` 限制
pub async fn open_standalone(config: &RedisConfig) -> Result<ConnectionManager> {
    let connection_string = resolve_connection_string(config);
    let mut info = connection_string
        .as_str()
        .into_connection_info()
        .map_err(|e| FlagError::Configuration(format!("invalid redis connection string: {}", e)))?;
    if let Some(password) = &config.password {
        info.redis.password = Some(password.expose_secret().to_string());
    }

    let client = Client::open(info)
        .map_err(|e| FlagError::Configuration(format!("failed to create redis client: {}", e)))?;

    let manager = match timeout(
        Duration::from_millis(config.connection_timeout_ms),
        client.get_connection_manager(),
    )
    .await
    {
        Ok(res) => res.map_err(FlagError::from_redis)?,
        Err(_) => {
            return Err(FlagError::unavailable(
                Tier::Cache,
                format!(
                    "Connection timed out after {}ms. Target: {}",
                    config.connection_timeout_ms,
                    redact_connection_string(&connection_string)
                ),
            ));
        }
    };

    info!(
        "Connected to redis at {}",
        redact_connection_string(&connection_string)
    );
    Ok(manager)
}
