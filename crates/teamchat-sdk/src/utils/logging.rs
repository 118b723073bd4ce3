//! 日志初始化
//!
//! SDK 内部只使用 `tracing` 宏；订阅者由宿主应用安装。
//! 宿主没有自己的订阅者时可以调用 [`init_logging`]。

use tracing_subscriber::{fmt, EnvFilter};

/// 安装全局 fmt 订阅者。`RUST_LOG` 优先；否则 debug_mode 下为 debug，默认 info。
///
/// 重复调用是安全的：已经安装过订阅者时直接返回 false。
pub fn init_logging(debug_mode: bool) -> bool {
    let default_level = if debug_mode { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

/// 测试用：输出写入 test writer，由 cargo test 捕获
#[cfg(test)]
pub(crate) fn init_test_logging() {
    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}
