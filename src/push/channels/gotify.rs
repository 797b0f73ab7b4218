//! Gotify 渠道

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::push::channel::{ChannelId, PushChannel};
use crate::push::error::PushError;
use crate::push::formatter::PushMessage;
use crate::push::transport::{join_url, send_checked, HttpRequest, HttpTransport};

/// Gotify 渠道配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GotifyConfig {
    /// 服务端地址
    pub server: String,
    /// 应用 token
    pub token: String,
}

/// Gotify 渠道
pub struct GotifyChannel {
    config: GotifyConfig,
    transport: Arc<dyn HttpTransport>,
}

impl GotifyChannel {
    pub fn new(config: GotifyConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    fn build_request(&self, message: &PushMessage<'_>) -> HttpRequest {
        let url = message.jump_url.clone().unwrap_or_default();
        let body = json!({
            "message": message.body,
            "extras": {
                "client::notification": {
                    "click": { "url": url },
                },
                "android::action": {
                    "onReceive": { "intentUrl": url },
                },
            },
        });

        HttpRequest::post_json(join_url(&self.config.server, "/message"), body)
            .bearer(Some(self.config.token.as_str()))
    }
}

impl PushChannel for GotifyChannel {
    fn id(&self) -> ChannelId {
        ChannelId::Gotify
    }

    fn push(&self, message: &PushMessage<'_>) -> Result<(), PushError> {
        send_checked(self.transport.as_ref(), &self.build_request(message))?;
        info!(channel = "gotify", order_id = %message.event.order_id, "Message sent successfully");
        Ok(())
    }
}
