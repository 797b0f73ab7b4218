//! 推送渠道 trait 定义

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::PushError;
use super::formatter::PushMessage;

/// 支持的推送渠道（封闭集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelId {
    /// Gotify 推送服务
    Gotify,
    /// OneBot v11 机器人（QQ 私聊/群聊）
    Ob11,
    /// Bark (iOS)
    Bark,
    /// ntfy
    Ntfy,
    /// 本地桌面通知
    DesktopNotify,
    /// PushPlus
    Pushplus,
    /// Server 酱
    ServerChan,
    /// 执行本地命令
    RunCommand,
}

impl ChannelId {
    pub const ALL: [ChannelId; 8] = [
        ChannelId::Gotify,
        ChannelId::Ob11,
        ChannelId::Bark,
        ChannelId::Ntfy,
        ChannelId::DesktopNotify,
        ChannelId::Pushplus,
        ChannelId::ServerChan,
        ChannelId::RunCommand,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelId::Gotify => "gotify",
            ChannelId::Ob11 => "ob11",
            ChannelId::Bark => "bark",
            ChannelId::Ntfy => "ntfy",
            ChannelId::DesktopNotify => "desktop_notify",
            ChannelId::Pushplus => "pushplus",
            ChannelId::ServerChan => "server_chan",
            ChannelId::RunCommand => "run_command",
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelId {
    type Err = PushError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChannelId::ALL
            .into_iter()
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| PushError::config(format!("unknown channel: {}", s)))
    }
}

/// 推送渠道 trait
///
/// 每个实现只做一次投递：一次 HTTP 请求、一次系统通知或一次命令执行。
/// 实现不得 panic，所有失败都通过 `PushError` 返回。
pub trait PushChannel: Send + Sync {
    /// 渠道标识（用于日志和结果汇总）
    fn id(&self) -> ChannelId;

    /// 发送已格式化的消息
    fn push(&self, message: &PushMessage) -> Result<(), PushError>;
}

/// 单个渠道的推送结果
#[derive(Debug)]
pub struct ChannelOutcome {
    pub channel: ChannelId,
    pub result: Result<(), PushError>,
}

impl ChannelOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_id_round_trips_through_str() {
        for id in ChannelId::ALL {
            assert_eq!(id.as_str().parse::<ChannelId>().unwrap(), id);
        }
    }

    #[test]
    fn test_channel_id_unknown_is_config_error() {
        let err = "telegram".parse::<ChannelId>().unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_channel_id_serde_snake_case() {
        let ids: Vec<ChannelId> =
            serde_json::from_str(r#"["desktop_notify", "server_chan", "run_command"]"#).unwrap();
        assert_eq!(
            ids,
            vec![ChannelId::DesktopNotify, ChannelId::ServerChan, ChannelId::RunCommand]
        );
        assert_eq!(serde_json::to_string(&ChannelId::Ob11).unwrap(), "\"ob11\"");
    }
}
