//! Copyright (c) 2025, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了基于Redis的缓存层实现。

use crate::backend::redis_provider::open_standalone;
use crate::client::FlagStore;
use crate::config::RedisConfig;
use crate::error::{FlagError, Result, Tier};
use crate::model::Flag;
use crate::serialization::{JsonSerializer, Serializer};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use std::future::Future;
use tokio::time::{timeout, Duration};
use tracing::{debug, instrument};

/// SCAN 每页建议返回的键数量
const SCAN_PAGE_SIZE: usize = 500;

/// Redis缓存层
///
/// 每个开关保存为 `<key_prefix><key>`，值为JSON序列化的开关，不设置过期时间。
/// 所有命令都受 `command_timeout_ms` 约束，超时视为缓存不可用。
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
    key_prefix: String,
    command_timeout_ms: u64,
    serializer: JsonSerializer,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("key_prefix", &self.key_prefix)
            .field("command_timeout_ms", &self.command_timeout_ms)
            .finish()
    }
}

impl RedisCache {
    /// 按配置连接Redis并创建缓存层
    #[instrument(skip(config), level = "info", name = "init_redis_cache")]
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let manager = open_standalone(config).await?;
        Ok(Self::from_manager(
            manager,
            config.key_prefix.clone(),
            config.command_timeout_ms,
        ))
    }

    /// 使用已有的连接管理器创建缓存层
    pub fn from_manager(
        manager: ConnectionManager,
        key_prefix: impl Into<String>,
        command_timeout_ms: u64,
    ) -> Self {
        Self {
            manager,
            key_prefix: key_prefix.into(),
            command_timeout_ms,
            serializer: JsonSerializer::new(),
        }
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    fn cache_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// 在命令超时限制内执行一条Redis命令
    async fn run<T, F>(&self, command: &str, fut: F) -> Result<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match timeout(Duration::from_millis(self.command_timeout_ms), fut).await {
            Ok(result) => result.map_err(FlagError::from_redis),
            Err(_) => Err(FlagError::unavailable(
                Tier::Cache,
                format!(
                    "{} timed out after {}ms",
                    command, self.command_timeout_ms
                ),
            )),
        }
    }

    /// 遍历前缀下的所有键
    async fn scan_keys(&self) -> Result<Vec<String>> {
        let mut conn = self.manager.clone();
        let pattern = format!("{}*", self.key_prefix);
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next_cursor, page): (u64, Vec<String>) = self
                .run(
                    "SCAN",
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(&pattern)
                        .arg("COUNT")
                        .arg(SCAN_PAGE_SIZE)
                        .query_async(&mut conn),
                )
                .await?;
            keys.extend(page);

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        Ok(keys)
    }

    /// 删除前缀下的所有开关
    ///
    /// 注意：仅删除以 `key_prefix` 开头的键
    ///
    /// # 返回值
    ///
    /// 返回删除的键数量
    #[instrument(skip(self), level = "debug")]
    pub async fn clear(&self) -> Result<usize> {
        let keys = self.scan_keys().await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.manager.clone();
        let mut pipe = redis::pipe();
        for key in &keys {
            pipe.del(key).ignore();
        }
        self.run::<(), _>("DEL", pipe.query_async(&mut conn))
            .await?;
        debug!("Redis clear: removed {} keys", keys.len());
        Ok(keys.len())
    }
}

#[async_trait]
impl FlagStore for RedisCache {
    #[instrument(skip(self), level = "debug")]
    async fn get(&self, key: &str) -> Result<Option<Flag>> {
        let mut conn = self.manager.clone();
        let cache_key = self.cache_key(key);
        let raw: Option<Vec<u8>> = self.run("GET", conn.get(&cache_key)).await?;

        match raw {
            Some(bytes) => {
                let flag: Flag = self.serializer.deserialize(&bytes).map_err(|e| {
                    FlagError::operation_failed(
                        Tier::Cache,
                        format!("malformed cache entry for '{}': {}", key, e),
                    )
                })?;
                debug!("Redis hit for key: {}", key);
                Ok(Some(flag))
            }
            None => {
                debug!("Redis miss for key: {}", key);
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, flag), level = "debug", fields(key = %flag.key))]
    async fn set(&self, flag: &Flag) -> Result<()> {
        let bytes = self.serializer.serialize(flag)?;
        let mut conn = self.manager.clone();
        let cache_key = self.cache_key(&flag.key);
        let _: () = self.run("SET", conn.set(&cache_key, bytes)).await?;
        Ok(())
    }

    /// 先用 SCAN 枚举键，再按页 MGET；非字符串类型的键与无法解码的条目被跳过
    #[instrument(skip(self), level = "debug")]
    async fn get_all(&self) -> Result<Vec<Flag>> {
        let keys = self.scan_keys().await?;
        let mut flags = Vec::with_capacity(keys.len());
        let mut conn = self.manager.clone();

        for chunk in keys.chunks(SCAN_PAGE_SIZE) {
            // MGET 对非字符串类型的键返回 nil，而不是让整批失败
            let values: Vec<Option<Vec<u8>>> = self
                .run("MGET", redis::cmd("MGET").arg(chunk).query_async(&mut conn))
                .await?;

            for (key, value) in chunk.iter().zip(values) {
                let Some(bytes) = value else {
                    // 在 SCAN 与 MGET 之间被删除，或不是字符串
                    continue;
                };
                match self.serializer.deserialize::<Flag>(&bytes) {
                    Ok(flag) => flags.push(flag),
                    Err(e) => debug!("Skipping undecodable cache entry {}: {}", key, e),
                }
            }
        }

        debug!("Redis enumerated {} flags", flags.len());
        Ok(flags)
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        let cache_key = self.cache_key(key);
        let _: () = self.run("DEL", conn.del(&cache_key)).await?;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn ping(&self) -> Result<()> {
        let mut conn = self.manager.clone();
        let _: String = self
            .run("PING", redis::cmd("PING").query_async(&mut conn))
            .await?;
        Ok(())
    }
}
