//! Server 酱渠道
//!
//! SendKey 决定接口地址：
//! - `sctp{uid}t...`（Server 酱³）→ `https://{uid}.push.ft07.com/send/{key}.send`
//! - 其他（Turbo 版）→ `https://sctapi.ftqq.com/{key}.send`

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use tracing::info;

use crate::push::channel::{ChannelId, PushChannel};
use crate::push::error::PushError;
use crate::push::formatter::PushMessage;
use crate::push::transport::{expect_code, send_checked, HttpRequest, HttpTransport};

/// Server 酱渠道配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerChanConfig {
    pub send_key: String,
}

static SCTP_KEY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^sctp(\d+)t").unwrap());

/// 根据 SendKey 推导接口地址
pub fn server_chan_endpoint(send_key: &str) -> Result<String, PushError> {
    if send_key.starts_with("sctp") {
        let uid = SCTP_KEY
            .captures(send_key)
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| PushError::config("invalid sendkey format for sctp"))?;
        Ok(format!(
            "https://{}.push.ft07.com/send/{}.send",
            uid.as_str(),
            send_key
        ))
    } else {
        Ok(format!("https://sctapi.ftqq.com/{}.send", send_key))
    }
}

/// Server 酱渠道，成功时响应体 `code == 0`
pub struct ServerChanChannel {
    config: ServerChanConfig,
    transport: Arc<dyn HttpTransport>,
}

impl ServerChanChannel {
    pub fn new(config: ServerChanConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }
}

impl PushChannel for ServerChanChannel {
    fn id(&self) -> ChannelId {
        ChannelId::ServerChan
    }

    fn push(&self, message: &PushMessage<'_>) -> Result<(), PushError> {
        let endpoint = server_chan_endpoint(self.config.send_key.trim())?;
        let request = HttpRequest::get(endpoint)
            .query("title", message.title.as_str())
            .query("desp", message.body.as_str());
        let response = send_checked(self.transport.as_ref(), &request)?;
        expect_code(&response, "code", 0)?;
        info!(channel = "server_chan", "Message sent successfully");
        Ok(())
    }
}
