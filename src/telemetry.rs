//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了开关服务的日志和链路追踪初始化。

use crate::config::TelemetryConfig;
use opentelemetry::global;
use opentelemetry::trace::TracerProvider;
use opentelemetry_sdk::trace::TracerProvider as SdkTracerProvider;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

/// 初始化日志与链路追踪
///
/// 此函数应该在应用程序启动时调用一次。
/// `RUST_LOG` 优先于配置中的 `log_level`；启用 OpenTelemetry 时
/// 额外挂载一个 tracing-opentelemetry 层并设置全局 tracer provider。
///
/// # 参数
///
/// * `config` - 遥测配置
pub fn init_tracing(config: &TelemetryConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

    let telemetry = if config.enable_opentelemetry {
        let provider = SdkTracerProvider::builder().build();
        global::set_tracer_provider(provider.clone());
        let tracer = provider.tracer(config.service_name.clone());
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    let subscriber = Registry::default()
        .with(filter)
        .with(fmt_layer)
        .with(telemetry);

    // 已经设置过全局 subscriber 时（例如测试中重复调用）忽略
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 关闭全局 tracer provider，刷新未导出的 span
pub fn shutdown_tracing() {
    global::shutdown_tracer_provider();
}
