//! ntfy 渠道

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::push::channel::{ChannelId, PushChannel};
use crate::push::error::PushError;
use crate::push::formatter::PushMessage;
use crate::push::transport::{join_url, send_checked, HttpRequest, HttpTransport};

/// 最高优先级
const NTFY_PRIORITY: u8 = 5;

/// ntfy 渠道配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NtfyConfig {
    /// 服务端地址，如 https://ntfy.sh
    pub server: String,
    /// 订阅主题
    pub topic: String,
}

/// ntfy 渠道（JSON 发布接口）
pub struct NtfyChannel {
    config: NtfyConfig,
    transport: Arc<dyn HttpTransport>,
}

impl NtfyChannel {
    pub fn new(config: NtfyConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    fn build_request(&self, message: &PushMessage<'_>) -> HttpRequest {
        let jump_url = message.jump_url.clone().unwrap_or_default();
        let body = json!({
            "topic": self.config.topic,
            // title 为提示语，message 为订单详情，不要对调
            "message": message.body,
            "title": message.title,
            "tags": ["tada", "loudspeaker"],
            "priority": NTFY_PRIORITY,
            "click": jump_url,
            "actions": [
                { "action": "view", "label": "付款", "url": jump_url },
            ],
        });
        HttpRequest::post_json(join_url(&self.config.server, "/"), body)
    }
}

impl PushChannel for NtfyChannel {
    fn id(&self) -> ChannelId {
        ChannelId::Ntfy
    }

    fn push(&self, message: &PushMessage<'_>) -> Result<(), PushError> {
        send_checked(self.transport.as_ref(), &self.build_request(message))?;
        info!(channel = "ntfy", topic = %self.config.topic, "Message sent successfully");
        Ok(())
    }
}
