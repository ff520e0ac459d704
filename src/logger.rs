//! 日志初始化
//!
//! 使用 tracing-subscriber，日志级别由 RUST_LOG 控制，默认 info。

use tracing_subscriber::EnvFilter;

/// 初始化全局日志订阅器
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
