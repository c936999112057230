//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了HTTP处理器共享的状态。

use crate::manager::{FlagService, ServiceStore};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct AppState {
    pub store: Arc<ServiceStore>,
}

impl From<&FlagService> for AppState {
    fn from(service: &FlagService) -> Self {
        Self {
            store: service.store().clone(),
        }
    }
}
