//! Bark 渠道 (iOS)

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::push::channel::{ChannelId, PushChannel};
use crate::push::error::PushError;
use crate::push::formatter::PushMessage;
use crate::push::transport::{join_url, send_checked, HttpRequest, HttpResponse, HttpTransport};

/// Bark 渠道配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarkConfig {
    /// 服务端地址，如 https://api.day.app
    pub server: String,
    /// device key
    pub key: String,
    /// 重要警告：忽略静音和勿扰模式，持续响铃
    #[serde(default)]
    pub enhanced: bool,
}

/// Bark 渠道
pub struct BarkChannel {
    config: BarkConfig,
    transport: Arc<dyn HttpTransport>,
}

impl BarkChannel {
    pub fn new(config: BarkConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    fn build_request(&self, message: &PushMessage<'_>) -> HttpRequest {
        let mut body = json!({
            "body": message.body,
            "title": message.title,
            "device_key": self.config.key,
            "url": message.jump_url.clone().unwrap_or_default(),
        });
        if self.config.enhanced {
            body["level"] = json!("critical");
            body["call"] = json!("1");
            body["volume"] = json!(10);
        }
        HttpRequest::post_json(join_url(&self.config.server, "/push"), body)
    }
}

impl PushChannel for BarkChannel {
    fn id(&self) -> ChannelId {
        ChannelId::Bark
    }

    fn push(&self, message: &PushMessage<'_>) -> Result<(), PushError> {
        let response = send_checked(self.transport.as_ref(), &self.build_request(message))?;
        check_bark_code(&response)?;
        info!(channel = "bark", enhanced = self.config.enhanced, "Message sent successfully");
        Ok(())
    }
}

/// Bark 服务端成功时返回 `{"code": 200}`；响应体缺少 code 时仅以 HTTP 状态为准
fn check_bark_code(response: &HttpResponse) -> Result<(), PushError> {
    let code = response
        .json()
        .ok()
        .and_then(|v| v.get("code").and_then(serde_json::Value::as_i64));
    match code {
        Some(200) | None => Ok(()),
        Some(other) => Err(PushError::rejected(format!("bark code {}: {}", other, response.body))),
    }
}
