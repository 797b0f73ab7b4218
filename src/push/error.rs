//! 推送错误类型
//!
//! 每个渠道的失败都归为以下几类之一，分发器只记录、不向上传播。

use thiserror::Error;

use super::channel::ChannelId;

/// 单个渠道推送失败的原因
#[derive(Debug, Error)]
pub enum PushError {
    /// 渠道配置不合法（例如无法识别的 SendKey 格式）
    #[error("invalid configuration: {0}")]
    Config(String),

    /// 启用了渠道但没有对应配置
    #[error("no configuration for channel {0}")]
    MissingConfig(ChannelId),

    /// 网络不可达、超时、客户端构建失败等
    #[error("transport failure: {0}")]
    Transport(String),

    /// HTTP 状态码非 2xx
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// HTTP 2xx 但响应体中的业务码表示失败
    #[error("gateway rejected: {0}")]
    Rejected(String),

    /// 本地通知或命令执行失败
    #[error("local execution failed: {0}")]
    LocalExecution(String),

    /// 渠道实现 panic（由分发器捕获）
    #[error("channel panicked: {0}")]
    Panicked(String),
}

impl PushError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn local(msg: impl Into<String>) -> Self {
        Self::LocalExecution(msg.into())
    }

    /// 是否为配置类错误（与投递失败区分）
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::MissingConfig(_))
    }
}
