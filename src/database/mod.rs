//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 持久存储模块
//!
//! 提供基于Sea-ORM的开关持久化，以及连接字符串处理工具

pub mod connection_string;
pub mod entity;
pub mod repository;

pub use connection_string::{
    ensure_database_directory, extract_sqlite_path, is_sqlite_memory,
    normalize_connection_string, DbType,
};
pub use repository::FlagRepository;
