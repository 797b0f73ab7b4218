//! 具体渠道实现

pub mod bark;
pub mod command;
pub mod desktop;
pub mod gotify;
pub mod ntfy;
pub mod ob11;
pub mod pushplus;
pub mod server_chan;

pub use bark::{BarkChannel, BarkConfig};
pub use command::{CommandChannel, CommandRunner, RunCommandConfig, SystemCommandRunner};
pub use desktop::{DesktopChannel, DesktopNotifier, DesktopNotifyConfig, SystemNotifier};
pub use gotify::{GotifyChannel, GotifyConfig};
pub use ntfy::{NtfyChannel, NtfyConfig};
pub use ob11::{Ob11Channel, Ob11Config};
pub use pushplus::{PushplusChannel, PushplusConfig};
pub use server_chan::{ServerChanChannel, ServerChanConfig};

use std::sync::Arc;
use std::time::Duration;

use super::channel::PushChannel;
use super::config::ChannelSettings;
use super::error::PushError;
use super::transport::{HttpTransport, ReqwestTransport};

/// 渠道依赖的外部能力：HTTP、桌面通知、进程执行
#[derive(Clone)]
pub struct Backends {
    pub http: Arc<dyn HttpTransport>,
    pub desktop: Arc<dyn DesktopNotifier>,
    pub commands: Arc<dyn CommandRunner>,
}

impl Backends {
    /// 真实系统实现
    pub fn system(http_timeout: Duration) -> Result<Self, PushError> {
        Ok(Self {
            http: Arc::new(ReqwestTransport::new(http_timeout)?),
            desktop: Arc::new(SystemNotifier::new()),
            commands: Arc::new(SystemCommandRunner),
        })
    }
}

/// 根据配置构造渠道
pub fn build_channel(settings: ChannelSettings, backends: &Backends) -> Box<dyn PushChannel> {
    match settings {
        ChannelSettings::Gotify(cfg) => {
            Box::new(GotifyChannel::new(cfg, Arc::clone(&backends.http)))
        }
        ChannelSettings::Ob11(cfg) => Box::new(Ob11Channel::new(cfg, Arc::clone(&backends.http))),
        ChannelSettings::Bark(cfg) => Box::new(BarkChannel::new(cfg, Arc::clone(&backends.http))),
        ChannelSettings::Ntfy(cfg) => Box::new(NtfyChannel::new(cfg, Arc::clone(&backends.http))),
        ChannelSettings::DesktopNotify(cfg) => {
            Box::new(DesktopChannel::new(cfg, Arc::clone(&backends.desktop)))
        }
        ChannelSettings::Pushplus(cfg) => {
            Box::new(PushplusChannel::new(cfg, Arc::clone(&backends.http)))
        }
        ChannelSettings::ServerChan(cfg) => {
            Box::new(ServerChanChannel::new(cfg, Arc::clone(&backends.http)))
        }
        ChannelSettings::RunCommand(cfg) => {
            Box::new(CommandChannel::new(cfg, Arc::clone(&backends.commands)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::push::channel::ChannelId;
    use crate::push::config::PushConfig;

    #[test]
    fn test_build_channel_matches_settings() {
        let config = PushConfig::from_json(
            r#"{
                "gotify": { "server": "http://g", "token": "t" },
                "server_chan": { "send_key": "SCTxyz" },
                "run_command": { "command": "true" }
            }"#,
        )
        .unwrap();
        let backends = Backends::system(Duration::from_secs(1)).unwrap();

        for id in [ChannelId::Gotify, ChannelId::ServerChan, ChannelId::RunCommand] {
            let settings = config.settings(id).unwrap();
            assert_eq!(build_channel(settings, &backends).id(), id);
        }
    }
}
