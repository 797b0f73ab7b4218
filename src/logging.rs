//! 日志初始化
//!
//! 通过 RUST_LOG 环境变量控制日志级别，默认为 info，
//! 例如 `RUST_LOG=bhyg_push=debug` 可以看到网关的原始响应。

use tracing_subscriber::{fmt, EnvFilter};

/// 默认过滤规则
pub const DEFAULT_FILTER: &str = "bhyg_push=info";

/// 安装 stderr 日志输出；已安装过时静默返回
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice_is_harmless() {
        init_logging();
        init_logging();
        tracing::info!("logging initialised");
    }
}
