//! Copyright (c) 2025, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了开关存储的指标收集功能。

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// 指标收集器
///
/// 每个缓存存储实例持有一份，不使用全局状态
#[derive(Debug, Default)]
pub struct Metrics {
    /// 请求总数统计
    /// key: "tier:op:result"
    requests_total: Mutex<BTreeMap<String, u64>>,
    /// 操作耗时
    /// key: "op" -> (total_duration_secs, count)
    operation_duration: Mutex<BTreeMap<String, (f64, u64)>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录请求指标
    ///
    /// # 参数
    ///
    /// * `tier` - 层级（cache/durable/store）
    /// * `op` - 操作类型（get/set/delete/get_all/repopulate）
    /// * `result` - 操作结果（hit/miss/ok/error/...）
    pub fn record(&self, tier: &str, op: &str, result: &str) {
        let key = format!("{}:{}:{}", tier, op, result);
        let mut map = self
            .requests_total
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *map.entry(key).or_insert(0) += 1;
    }

    /// 记录操作耗时
    pub fn record_duration(&self, op: &str, duration_secs: f64) {
        let mut map = self
            .operation_duration
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let entry = map.entry(op.to_string()).or_insert((0.0, 0));
        entry.0 += duration_secs;
        entry.1 += 1;
    }

    /// 读取某个计数器
    pub fn count(&self, tier: &str, op: &str, result: &str) -> u64 {
        let key = format!("{}:{}:{}", tier, op, result);
        self.requests_total
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .copied()
            .unwrap_or(0)
    }

    /// 读取某个操作的耗时采样次数
    pub fn duration_count(&self, op: &str) -> u64 {
        self.operation_duration
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(op)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    /// 将所有指标格式化为文本，用于监控系统采集
    pub fn render(&self) -> String {
        let mut output = String::new();
        {
            let reqs = self
                .requests_total
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            for (k, v) in reqs.iter() {
                let parts: Vec<&str> = k.splitn(3, ':').collect();
                if let [tier, op, result] = parts.as_slice() {
                    output.push_str(&format!(
                        "flag_requests_total{{tier=\"{}\", operation=\"{}\", result=\"{}\"}} {}\n",
                        tier, op, result, v
                    ));
                }
            }
        }

        let dur = self
            .operation_duration
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for (op, (total, count)) in dur.iter() {
            output.push_str(&format!(
                "flag_operation_duration_seconds_sum{{operation=\"{}\"}} {}\n",
                op, total
            ));
            output.push_str(&format!(
                "flag_operation_duration_seconds_count{{operation=\"{}\"}} {}\n",
                op, count
            ));
        }
        output
    }
}
