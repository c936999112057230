//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了功能开关的数据模型。

use crate::error::{FlagError, Result};
use serde::{Deserialize, Serialize};

/// 键的最大长度（字节）
pub const MAX_KEY_LENGTH: usize = 256;

/// 功能开关
///
/// 一个带有可选描述的命名布尔开关。两层存储中都以 `key` 为唯一标识，
/// 写入时整条记录被替换，不支持部分字段更新。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    pub key: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Flag {
    pub fn new(key: impl Into<String>, enabled: bool) -> Self {
        Self {
            key: key.into(),
            enabled,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// 校验开关的键
    pub fn validate(&self) -> Result<()> {
        validate_key(&self.key)
    }
}

/// 校验开关键
///
/// 键不能为空，长度不超过 [`MAX_KEY_LENGTH`]（持久层主键列宽）；不限制字符
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(FlagError::InvalidFlag("key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(FlagError::InvalidFlag(format!(
            "key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}
