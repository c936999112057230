//! Copyright (c) 2025, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了缓存开关存储：在易失缓存与持久存储之间协调读写。
//!
//! - 读：旁路缓存（cache-aside），未命中时从持久存储加载并回填缓存
//! - 写：直写（write-through），先持久存储后缓存
//! - 删：按 [`DeleteOrder`] 的顺序删除两层

use super::FlagStore;
use crate::error::{FlagError, Result};
use crate::health::{probe, HealthReport};
use crate::metrics::Metrics;
use crate::model::{validate_key, Flag};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// 删除时两层的执行顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOrder {
    /// 先删持久存储，再删缓存。持久存储删除失败时缓存保持不变。
    #[default]
    DurableFirst,
    /// 先删缓存，再删持久存储。缓存删除失败时不会尝试持久存储；
    /// 持久存储删除失败时，下一次读取会把旧记录重新写回缓存。
    CacheFirst,
}

/// 健康检查默认超时（毫秒）
const DEFAULT_HEALTH_TIMEOUT_MS: u64 = 2000;

/// 缓存开关存储
///
/// 对任意一对实现了 [`FlagStore`] 的层通用，自身也实现 [`FlagStore`]。
/// 除两个层句柄外不持有共享状态，同一操作内对各层的请求严格顺序执行，
/// 不做跨请求加锁。
pub struct CachedFlagStore<C, D> {
    /// 易失缓存层
    cache: C,
    /// 持久存储层
    durable: D,
    /// 删除顺序
    delete_order: DeleteOrder,
    /// 健康检查超时（毫秒）
    health_timeout_ms: u64,
    /// 指标
    metrics: Arc<Metrics>,
}

impl<C, D> std::fmt::Debug for CachedFlagStore<C, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedFlagStore")
            .field("delete_order", &self.delete_order)
            .field("health_timeout_ms", &self.health_timeout_ms)
            .finish()
    }
}

impl<C: FlagStore, D: FlagStore> CachedFlagStore<C, D> {
    /// 创建新的缓存开关存储
    ///
    /// # 参数
    ///
    /// * `cache` - 易失缓存层
    /// * `durable` - 持久存储层
    pub fn new(cache: C, durable: D) -> Self {
        Self {
            cache,
            durable,
            delete_order: DeleteOrder::default(),
            health_timeout_ms: DEFAULT_HEALTH_TIMEOUT_MS,
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub fn with_delete_order(mut self, delete_order: DeleteOrder) -> Self {
        self.delete_order = delete_order;
        self
    }

    pub fn with_health_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.health_timeout_ms = timeout_ms;
        self
    }

    pub fn delete_order(&self) -> DeleteOrder {
        self.delete_order
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn durable(&self) -> &D {
        &self.durable
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// 探测两层的健康状态
    pub async fn health(&self) -> HealthReport {
        HealthReport {
            cache: probe("cache", &self.cache, self.health_timeout_ms).await,
            store: probe("durable store", &self.durable, self.health_timeout_ms).await,
        }
    }

    /// 缓存预热
    ///
    /// 把持久存储中的全部开关写入缓存，任一写入失败即中止
    ///
    /// # 返回值
    ///
    /// 返回写入缓存的开关数量
    #[instrument(skip(self), level = "info")]
    pub async fn warmup(&self) -> Result<usize> {
        let flags = self.durable.get_all().await?;
        for flag in &flags {
            self.cache.set(flag).await?;
        }
        info!("Warmed cache with {} flags", flags.len());
        Ok(flags.len())
    }

    async fn durable_get(&self, key: &str) -> Result<Option<Flag>> {
        match self.durable.get(key).await {
            Ok(found) => {
                let result = if found.is_some() { "hit" } else { "miss" };
                self.metrics.record("durable", "get", result);
                Ok(found)
            }
            Err(e) => {
                self.metrics.record("durable", "get", "error");
                Err(e)
            }
        }
    }

    async fn get_inner(&self, key: &str) -> Result<Option<Flag>> {
        match self.cache.get(key).await {
            Ok(Some(flag)) => {
                self.metrics.record("cache", "get", "hit");
                debug!("Cache hit for key: {}", key);
                Ok(Some(flag))
            }
            Ok(None) => {
                self.metrics.record("cache", "get", "miss");
                debug!("Cache miss for key: {}", key);
                let found = self.durable_get(key).await?;
                if let Some(flag) = &found {
                    // 缓存可达却写入失败时，错误向上传递
                    self.cache.set(flag).await?;
                    self.metrics.record("cache", "repopulate", "ok");
                }
                Ok(found)
            }
            Err(cache_err) => {
                self.metrics.record("cache", "get", "error");
                warn!(
                    "Cache lookup failed for key {}, falling back to durable store: {}",
                    key, cache_err
                );
                let found = self.durable_get(key).await?;
                if let Some(flag) = &found {
                    match self.cache.set(flag).await {
                        Ok(()) => self.metrics.record("cache", "repopulate", "ok"),
                        Err(e) => {
                            self.metrics.record("cache", "repopulate", "failed");
                            warn!("Cache repopulation failed for key {}: {}", key, e);
                        }
                    }
                }
                Ok(found)
            }
        }
    }

    async fn set_inner(&self, flag: &Flag) -> Result<()> {
        if let Err(e) = self.durable.set(flag).await {
            self.metrics.record("durable", "set", "error");
            return Err(e);
        }
        self.metrics.record("durable", "set", "ok");

        if let Err(e) = self.cache.set(flag).await {
            self.metrics.record("store", "set", "partial_write");
            warn!(
                "Flag {} persisted but cache write failed: {}",
                flag.key, e
            );
            return Err(FlagError::PartialWrite {
                key: flag.key.clone(),
                source: Box::new(e),
            });
        }
        self.metrics.record("cache", "set", "ok");
        Ok(())
    }

    async fn get_all_inner(&self) -> Result<Vec<Flag>> {
        let mut flags = self.cache.get_all().await?;

        if flags.is_empty() {
            self.metrics.record("cache", "get_all", "miss");
            flags = self.durable.get_all().await?;
            let mut failed = 0usize;
            for flag in &flags {
                if self.cache.set(flag).await.is_err() {
                    failed += 1;
                }
            }
            if failed > 0 {
                self.metrics.record("cache", "repopulate", "failed");
                debug!(
                    "Cache repopulation skipped {} of {} flags",
                    failed,
                    flags.len()
                );
            }
        } else {
            self.metrics.record("cache", "get_all", "hit");
        }

        flags.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(flags)
    }

    async fn delete_inner(&self, key: &str) -> Result<()> {
        match self.delete_order {
            DeleteOrder::DurableFirst => {
                self.durable.delete(key).await?;
                self.cache.delete(key).await?;
            }
            DeleteOrder::CacheFirst => {
                self.cache.delete(key).await?;
                self.durable.delete(key).await?;
            }
        }
        self.metrics.record("store", "delete", "ok");
        Ok(())
    }
}

#[async_trait]
impl<C: FlagStore, D: FlagStore> FlagStore for CachedFlagStore<C, D> {
    /// 读取开关
    ///
    /// 1. 缓存命中直接返回，不访问持久存储
    /// 2. 缓存明确返回不存在时查询持久存储，命中则回填缓存，回填失败返回错误
    /// 3. 缓存查询出错时视为缓存故障，回退到持久存储，回填失败被忽略
    #[instrument(skip(self), level = "debug")]
    async fn get(&self, key: &str) -> Result<Option<Flag>> {
        validate_key(key)?;
        let started = Instant::now();
        let result = self.get_inner(key).await;
        self.metrics
            .record_duration("get", started.elapsed().as_secs_f64());
        result
    }

    /// 写入开关
    ///
    /// 先写持久存储，失败则直接返回且不触碰缓存；
    /// 持久存储成功而缓存失败时返回 [`FlagError::PartialWrite`]
    #[instrument(skip(self, flag), level = "debug", fields(key = %flag.key))]
    async fn set(&self, flag: &Flag) -> Result<()> {
        flag.validate()?;
        let started = Instant::now();
        let result = self.set_inner(flag).await;
        self.metrics
            .record_duration("set", started.elapsed().as_secs_f64());
        result
    }

    /// 获取全部开关
    ///
    /// 缓存枚举非空时直接返回；为空时（冷缓存与“确实没有开关”无法区分）
    /// 查询持久存储并尽力回填缓存。结果按键排序。
    #[instrument(skip(self), level = "debug")]
    async fn get_all(&self) -> Result<Vec<Flag>> {
        let started = Instant::now();
        let result = self.get_all_inner().await;
        self.metrics
            .record_duration("get_all", started.elapsed().as_secs_f64());
        result
    }

    /// 删除开关
    ///
    /// 按 [`DeleteOrder`] 顺序执行，第一个失败的层中止操作并原样返回错误
    #[instrument(skip(self), level = "debug")]
    async fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        let started = Instant::now();
        let result = self.delete_inner(key).await;
        self.metrics
            .record_duration("delete", started.elapsed().as_secs_f64());
        result
    }

    async fn ping(&self) -> Result<()> {
        self.durable.ping().await?;
        self.cache.ping().await
    }
}
