//! Copyright (c) 2025, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了两层存储的健康检查。

use crate::client::FlagStore;
use tokio::time::{timeout, Duration};
use tracing::warn;

/// 单层健康状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierStatus {
    Up,
    Down(String),
}

impl TierStatus {
    pub fn is_up(&self) -> bool {
        matches!(self, TierStatus::Up)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TierStatus::Up => "up",
            TierStatus::Down(_) => "down",
        }
    }

    /// 故障原因
    pub fn reason(&self) -> Option<&str> {
        match self {
            TierStatus::Up => None,
            TierStatus::Down(reason) => Some(reason),
        }
    }
}

/// 健康报告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub cache: TierStatus,
    pub store: TierStatus,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.cache.is_up() && self.store.is_up()
    }

    /// `ok` 或 `degraded`
    pub fn status(&self) -> &'static str {
        if self.is_healthy() {
            "ok"
        } else {
            "degraded"
        }
    }
}

/// 在超时限制内探测一层存储
pub async fn probe<S: FlagStore + ?Sized>(name: &str, store: &S, timeout_ms: u64) -> TierStatus {
    match timeout(Duration::from_millis(timeout_ms), store.ping()).await {
        Ok(Ok(())) => TierStatus::Up,
        Ok(Err(e)) => {
            warn!("{} health check failed: {}", name, e);
            TierStatus::Down(e.to_string())
        }
        Err(_) => {
            warn!("{} health check timed out after {}ms", name, timeout_ms);
            TierStatus::Down(format!("ping timed out after {}ms", timeout_ms))
        }
    }
}
