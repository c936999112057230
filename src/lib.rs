//! flagcache - 带缓存的功能开关服务
//!
//! 在持久的SQL存储之前放置一层易失缓存（Redis或进程内Moka），
//! 读取走旁路缓存，写入走直写，删除按可配置顺序协调两层。

#![doc(html_root_url = "https://docs.rs/flagcache/0.1.0")]

pub mod backend;
pub mod cli;
pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod health;
pub mod manager;
pub mod metrics;
pub mod model;
pub mod serialization;
pub mod server;
pub mod telemetry;
pub mod utils;

// Re-export commonly used items
pub use client::{CachedFlagStore, DeleteOrder, FlagStore, SharedFlagStore};
pub use config::Config;
pub use error::{FlagError, Result, Tier};
pub use manager::FlagService;
pub use model::Flag;

/// flagcache 版本号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
