//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 连接字符串规范化模块
//!
//! 识别数据库类型，并为 SQLite 文件库补全创建模式和目录。

use crate::error::{FlagError, Result};
use std::path::Path;

/// 数据库类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbType {
    SQLite,
    MySQL,
    PostgreSQL,
}

impl DbType {
    /// 从连接字符串推断数据库类型
    pub fn from_connection_string(s: &str) -> Self {
        let lower = s.to_lowercase();
        if lower.starts_with("mysql") {
            DbType::MySQL
        } else if lower.starts_with("postgres") {
            DbType::PostgreSQL
        } else {
            DbType::SQLite
        }
    }
}

/// 是否为 SQLite 内存数据库
pub fn is_sqlite_memory(s: &str) -> bool {
    DbType::from_connection_string(s) == DbType::SQLite
        && (s.contains(":memory:") || s.contains("mode=memory"))
}

/// 提取 SQLite 数据库文件路径
///
/// 如果连接字符串指向内存数据库或不是 SQLite，返回 None
pub fn extract_sqlite_path(s: &str) -> Option<String> {
    if DbType::from_connection_string(s) != DbType::SQLite || is_sqlite_memory(s) {
        return None;
    }
    let without_scheme = s
        .strip_prefix("sqlite://")
        .or_else(|| s.strip_prefix("sqlite:"))
        .unwrap_or(s);
    let path = without_scheme.split('?').next().unwrap_or_default();
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

/// 规范化连接字符串
///
/// SQLite 文件库缺少 `mode` 参数时补上 `mode=rwc`，使文件不存在时自动创建
pub fn normalize_connection_string(s: &str) -> String {
    if extract_sqlite_path(s).is_none() || s.contains("mode=") {
        return s.to_string();
    }
    if s.contains('?') {
        format!("{}&mode=rwc", s)
    } else {
        format!("{}?mode=rwc", s)
    }
}

/// 确保 SQLite 数据库目录存在
///
/// # 返回
///
/// 规范化后的连接字符串
pub fn ensure_database_directory(s: &str) -> Result<String> {
    if let Some(path) = extract_sqlite_path(s) {
        if let Some(parent) = Path::new(&path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    FlagError::Configuration(format!(
                        "cannot create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
    }
    Ok(normalize_connection_string(s))
}
