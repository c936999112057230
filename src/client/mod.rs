//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了开关存储的统一接口，缓存层、持久层以及组合后的
//! 缓存存储都实现同一个特征。

pub mod cached;

use crate::error::Result;
use crate::model::Flag;
use async_trait::async_trait;
use std::sync::Arc;

pub use cached::{CachedFlagStore, DeleteOrder};

/// 开关存储特征
///
/// 定义 get / set / get_all / delete 四个基本操作。
/// `get` 必须区分“键不存在”（`Ok(None)`）与“层不可达”（`Err`），
/// 缓存存储的回退逻辑依赖这一区别。
#[async_trait]
pub trait FlagStore: Send + Sync {
    /// 获取开关
    ///
    /// # 参数
    ///
    /// * `key` - 开关键
    ///
    /// # 返回值
    ///
    /// 返回开关，如果不存在则返回None
    async fn get(&self, key: &str) -> Result<Option<Flag>>;

    /// 写入开关（存在则整体覆盖）
    async fn set(&self, flag: &Flag) -> Result<()>;

    /// 获取全部开关
    async fn get_all(&self) -> Result<Vec<Flag>>;

    /// 删除开关，键不存在时不报错
    async fn delete(&self, key: &str) -> Result<()>;

    /// 检查连接是否正常
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// 动态分发的共享存储句柄
pub type SharedFlagStore = Arc<dyn FlagStore>;

#[async_trait]
impl<T: FlagStore + ?Sized> FlagStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<Flag>> {
        (**self).get(key).await
    }

    async fn set(&self, flag: &Flag) -> Result<()> {
        (**self).set(flag).await
    }

    async fn get_all(&self) -> Result<Vec<Flag>> {
        (**self).get_all().await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key).await
    }

    async fn ping(&self) -> Result<()> {
        (**self).ping().await
    }
}
