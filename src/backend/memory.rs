//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了进程内缓存层的实现，基于Moka的内存缓存。

use crate::client::FlagStore;
use crate::error::Result;
use crate::model::Flag;
use async_trait::async_trait;
use moka::future::Cache;
use tracing::{debug, instrument};

/// 内存缓存层
///
/// 适用于单节点部署和测试。条目没有过期时间，只会因容量淘汰或显式删除而消失；
/// 该层永远不会返回传输错误。
#[derive(Clone)]
pub struct MemoryCache {
    cache: Cache<String, Flag>,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

impl MemoryCache {
    /// 创建新的内存缓存
    ///
    /// # 参数
    ///
    /// * `max_capacity` - 最大条目数
    pub fn new(max_capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_capacity).build(),
        }
    }

    /// 逐个删除所有条目，模拟缓存被外部刷新
    ///
    /// # 返回值
    ///
    /// 返回删除的条目数量
    pub async fn clear(&self) -> usize {
        let keys: Vec<String> = self.cache.iter().map(|(k, _)| k.as_ref().clone()).collect();
        for key in &keys {
            self.cache.invalidate(key).await;
        }
        keys.len()
    }
}

#[async_trait]
impl FlagStore for MemoryCache {
    #[instrument(skip(self), level = "debug")]
    async fn get(&self, key: &str) -> Result<Option<Flag>> {
        let found = self.cache.get(key).await;
        debug!("memory cache get: key={}, found={}", key, found.is_some());
        Ok(found)
    }

    #[instrument(skip(self, flag), level = "debug", fields(key = %flag.key))]
    async fn set(&self, flag: &Flag) -> Result<()> {
        self.cache.insert(flag.key.clone(), flag.clone()).await;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_all(&self) -> Result<Vec<Flag>> {
        let flags: Vec<Flag> = self.cache.iter().map(|(_, flag)| flag).collect();
        debug!("memory cache enumerated {} flags", flags.len());
        Ok(flags)
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete(&self, key: &str) -> Result<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }
}
