//! PushPlus 渠道

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::push::channel::{ChannelId, PushChannel};
use crate::push::error::PushError;
use crate::push::formatter::PushMessage;
use crate::push::transport::{expect_code, send_checked, HttpRequest, HttpTransport};

/// PushPlus 发送接口
pub const PUSHPLUS_URL: &str = "http://www.pushplus.plus/send";

/// PushPlus 渠道配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushplusConfig {
    pub token: String,
}

/// PushPlus 渠道，成功时响应体 `code == 200`
pub struct PushplusChannel {
    config: PushplusConfig,
    transport: Arc<dyn HttpTransport>,
}

impl PushplusChannel {
    pub fn new(config: PushplusConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }
}

impl PushChannel for PushplusChannel {
    fn id(&self) -> ChannelId {
        ChannelId::Pushplus
    }

    fn push(&self, message: &PushMessage<'_>) -> Result<(), PushError> {
        let request = HttpRequest::post_json(
            PUSHPLUS_URL,
            json!({
                "token": self.config.token,
                "title": message.title,
                "content": message.body,
            }),
        );
        let response = send_checked(self.transport.as_ref(), &request)?;
        expect_code(&response, "code", 200)?;
        info!(channel = "pushplus", "Message sent successfully");
        Ok(())
    }
}
