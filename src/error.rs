//! Copyright (c) 2025, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了开关服务的错误类型和处理机制。

use std::fmt;
use thiserror::Error;

/// 存储层级
///
/// 用于标记错误来自哪一层存储
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// 易失缓存（Redis / 内存）
    Cache,
    /// 持久存储（SQL数据库）
    Durable,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Cache => write!(f, "cache"),
            Tier::Durable => write!(f, "durable store"),
        }
    }
}

/// 开关服务错误类型枚举
///
/// “未找到”不是错误，由 `Ok(None)` 表示
#[derive(Error, Debug)]
pub enum FlagError {
    /// 与某一层的传输/连接失败
    #[error("{tier} unavailable: {message}")]
    Unavailable { tier: Tier, message: String },

    /// 层可达，但具体操作失败（例如存储的数据格式错误）
    #[error("{tier} operation failed: {message}")]
    OperationFailed { tier: Tier, message: String },

    /// 持久存储写入成功，但缓存写入失败
    #[error("flag '{key}' stored durably but cache write failed: {source}")]
    PartialWrite {
        key: String,
        #[source]
        source: Box<FlagError>,
    },

    /// 开关数据不合法
    #[error("Invalid flag: {0}")]
    InvalidFlag(String),

    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// 配置错误
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO错误
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FlagError {
    pub fn unavailable(tier: Tier, message: impl Into<String>) -> Self {
        FlagError::Unavailable {
            tier,
            message: message.into(),
        }
    }

    pub fn operation_failed(tier: Tier, message: impl Into<String>) -> Self {
        FlagError::OperationFailed {
            tier,
            message: message.into(),
        }
    }

    /// 是否为传输层故障
    pub fn is_unavailable(&self) -> bool {
        matches!(self, FlagError::Unavailable { .. })
    }

    /// 错误来源层级，不属于任何层时返回None
    pub fn tier(&self) -> Option<Tier> {
        match self {
            FlagError::Unavailable { tier, .. } | FlagError::OperationFailed { tier, .. } => {
                Some(*tier)
            }
            FlagError::PartialWrite { .. } => Some(Tier::Cache),
            _ => None,
        }
    }

    /// 将Redis错误映射为缓存层错误
    ///
    /// IO、超时、拒绝连接、连接断开视为不可用，其余为操作失败
    pub fn from_redis(err: redis::RedisError) -> Self {
        if err.is_io_error()
            || err.is_timeout()
            || err.is_connection_refusal()
            || err.is_connection_dropped()
        {
            FlagError::unavailable(Tier::Cache, err.to_string())
        } else {
            FlagError::operation_failed(Tier::Cache, err.to_string())
        }
    }

    /// 将Sea-ORM错误映射为持久层错误
    pub fn from_db(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::Conn(_) | sea_orm::DbErr::ConnectionAcquire(_) => {
                FlagError::unavailable(Tier::Durable, err.to_string())
            }
            other => FlagError::operation_failed(Tier::Durable, other.to_string()),
        }
    }
}

/// 操作结果类型别名
pub type Result<T> = std::result::Result<T, FlagError>;
