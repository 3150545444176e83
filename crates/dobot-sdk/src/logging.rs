//! 日志初始化
//!
//! 库内部只使用 `tracing` 宏输出诊断信息；应用程序调用 [`init_logger`]
//! 安装全局 subscriber。`RUST_LOG` 环境变量优先于默认过滤规则。

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// 使用默认过滤规则（`info`）初始化日志
///
/// 返回本次调用是否安装了全局 subscriber；重复调用返回 `false`。
pub fn init_logger() -> bool {
    init_logger_with_filter("info")
}

/// 使用指定的默认过滤规则初始化日志，例如 `"dobot_driver=debug,info"`
pub fn init_logger_with_filter(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt::layer());
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return false;
    }

    // 将依赖中 `log` crate 的记录转发到 tracing
    if let Err(e) = tracing_log::LogTracer::init() {
        tracing::debug!("log bridge already installed: {}", e);
    }
    true
}
