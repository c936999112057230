//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了开关服务管理器，负责按配置组装缓存层与持久层。

use crate::backend::{MemoryCache, RedisCache};
use crate::client::{CachedFlagStore, DeleteOrder, SharedFlagStore};
use crate::config::{CacheBackend, Config};
use crate::database::FlagRepository;
use crate::error::{FlagError, Result};
use std::sync::Arc;
use tracing::{info, instrument};

/// 运行时使用的缓存存储，两层均为动态分发
pub type ServiceStore = CachedFlagStore<SharedFlagStore, SharedFlagStore>;

/// 开关服务
///
/// 持有组装好的缓存存储，可在HTTP处理器和CLI命令之间共享
#[derive(Clone, Debug)]
pub struct FlagService {
    store: Arc<ServiceStore>,
}

impl FlagService {
    /// 按配置初始化开关服务
    ///
    /// # 参数
    ///
    /// * `config` - 服务配置
    ///
    /// # 返回值
    ///
    /// 任一层初始化失败时返回相应的错误
    #[instrument(skip(config), level = "info", fields(backend = ?config.cache.backend))]
    pub async fn from_config(config: &Config) -> Result<Self> {
        config.validate().map_err(FlagError::Configuration)?;

        let cache: SharedFlagStore = match config.cache.backend {
            CacheBackend::Redis => Arc::new(RedisCache::connect(&config.cache.redis).await?),
            CacheBackend::Memory => Arc::new(MemoryCache::new(config.cache.memory.max_capacity)),
        };
        let durable: SharedFlagStore = Arc::new(FlagRepository::connect(&config.store).await?);

        info!(
            "Flag service ready (cache: {:?}, delete order: {:?})",
            config.cache.backend, config.consistency.delete_order
        );
        Ok(Self::from_parts(
            cache,
            durable,
            config.consistency.delete_order,
        ))
    }

    /// 使用已有的两层组装服务
    pub fn from_parts(
        cache: SharedFlagStore,
        durable: SharedFlagStore,
        delete_order: DeleteOrder,
    ) -> Self {
        let store = CachedFlagStore::new(cache, durable).with_delete_order(delete_order);
        Self {
            store: Arc::new(store),
        }
    }

    pub fn store(&self) -> &Arc<ServiceStore> {
        &self.store
    }
}
