//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了易失缓存层的后端实现：Redis单机与进程内Moka缓存。

pub mod memory;
pub mod redis_cache;
pub mod redis_provider;

pub use memory::MemoryCache;
pub use redis_cache::RedisCache;
