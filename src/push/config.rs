//! 推送配置
//!
//! JSON 格式，与购票端保存的 `push_config` 一致：
//! ```json
//! {
//!   "push_actions": ["gotify", "desktop_notify"],
//!   "gotify": { "server": "https://gotify.example.com", "token": "xxx" },
//!   "desktop_notify": { "need_sound": true, "sound_path": "/path/to/alert.mp3" }
//! }
//! ```
//!
//! 配置读取优先级（`auto_load`）：
//! 1. 环境变量 `BHYG_PUSH_CONFIG` 指向的文件
//! 2. `<config_dir>/bhyg/push.json`
//! 3. 默认配置（不启用任何渠道）

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::channel::ChannelId;
use super::channels::{
    BarkConfig, DesktopNotifyConfig, GotifyConfig, NtfyConfig, Ob11Config, PushplusConfig,
    RunCommandConfig, ServerChanConfig,
};
use super::error::PushError;
use super::transport::DEFAULT_TIMEOUT_SECS;

/// 配置文件路径环境变量
pub const CONFIG_ENV: &str = "BHYG_PUSH_CONFIG";

/// 全部渠道配置
///
/// 各渠道的配置段保持原始 JSON，推送时才解析为具体类型：
/// 某个渠道的配置写错只会让该渠道失败，不影响整份配置的加载。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    /// 启用的渠道，按顺序推送；未知渠道名会被忽略
    #[serde(deserialize_with = "known_channels")]
    pub push_actions: Vec<ChannelId>,
    /// 每个 HTTP 渠道的超时（秒）
    pub http_timeout_secs: u64,
    pub gotify: Option<Value>,
    pub ob11: Option<Value>,
    pub bark: Option<Value>,
    pub ntfy: Option<Value>,
    pub desktop_notify: Option<Value>,
    pub pushplus: Option<Value>,
    pub server_chan: Option<Value>,
    pub run_command: Option<Value>,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            push_actions: Vec::new(),
            http_timeout_secs: DEFAULT_TIMEOUT_SECS,
            gotify: None,
            ob11: None,
            bark: None,
            ntfy: None,
            desktop_notify: None,
            pushplus: None,
            server_chan: None,
            run_command: None,
        }
    }
}

/// 解析后的渠道配置
#[derive(Debug, Clone)]
pub enum ChannelSettings {
    Gotify(GotifyConfig),
    Ob11(Ob11Config),
    Bark(BarkConfig),
    Ntfy(NtfyConfig),
    DesktopNotify(DesktopNotifyConfig),
    Pushplus(PushplusConfig),
    ServerChan(ServerChanConfig),
    RunCommand(RunCommandConfig),
}

fn known_channels<'de, D>(deserializer: D) -> std::result::Result<Vec<ChannelId>, D::Error>
where
    D: Deserializer<'de>,
{
    let names = Vec::<String>::deserialize(deserializer)?;
    Ok(names
        .iter()
        .filter_map(|name| match name.parse::<ChannelId>() {
            Ok(id) => Some(id),
            Err(_) => {
                warn!(channel = %name, "Unknown push channel, ignoring");
                None
            }
        })
        .collect())
}

fn parse_section<T: DeserializeOwned>(
    channel: ChannelId,
    section: Option<&Value>,
) -> std::result::Result<T, PushError> {
    let section = section.ok_or(PushError::MissingConfig(channel))?;
    T::deserialize(section)
        .map_err(|e| PushError::config(format!("invalid {} config: {}", channel, e)))
}

impl PushConfig {
    /// 从 JSON 字符串解析
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse push config")
    }

    /// 从文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read push config {}", path.display()))?;
        let config = Self::from_json(&content)
            .with_context(|| format!("Invalid push config {}", path.display()))?;
        info!(
            path = %path.display(),
            channels = ?config.push_actions,
            "Loaded push config"
        );
        Ok(config)
    }

    /// 按优先级自动查找配置文件，找不到时返回默认配置
    pub fn auto_load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.trim().is_empty() {
                return Self::load(path.trim());
            }
        }

        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::load(path);
            }
            debug!(path = %path.display(), "No push config file, using defaults");
        }

        Ok(Self::default())
    }

    /// 默认配置文件路径
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bhyg").join("push.json"))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }

    fn section(&self, channel: ChannelId) -> Option<&Value> {
        match channel {
            ChannelId::Gotify => self.gotify.as_ref(),
            ChannelId::Ob11 => self.ob11.as_ref(),
            ChannelId::Bark => self.bark.as_ref(),
            ChannelId::Ntfy => self.ntfy.as_ref(),
            ChannelId::DesktopNotify => self.desktop_notify.as_ref(),
            ChannelId::Pushplus => self.pushplus.as_ref(),
            ChannelId::ServerChan => self.server_chan.as_ref(),
            ChannelId::RunCommand => self.run_command.as_ref(),
        }
    }

    /// 解析渠道配置
    ///
    /// 没有配置段时返回 `MissingConfig`，配置段格式错误时返回 `Config`。
    pub fn settings(&self, channel: ChannelId) -> std::result::Result<ChannelSettings, PushError> {
        let section = self.section(channel);
        Ok(match channel {
            ChannelId::Gotify => ChannelSettings::Gotify(parse_section(channel, section)?),
            ChannelId::Ob11 => ChannelSettings::Ob11(parse_section(channel, section)?),
            ChannelId::Bark => ChannelSettings::Bark(parse_section(channel, section)?),
            ChannelId::Ntfy => ChannelSettings::Ntfy(parse_section(channel, section)?),
            ChannelId::DesktopNotify => {
                ChannelSettings::DesktopNotify(parse_section(channel, section)?)
            }
            ChannelId::Pushplus => ChannelSettings::Pushplus(parse_section(channel, section)?),
            ChannelId::ServerChan => ChannelSettings::ServerChan(parse_section(channel, section)?),
            ChannelId::RunCommand => ChannelSettings::RunCommand(parse_section(channel, section)?),
        })
    }
}
