//! OneBot v11 渠道 - 通过机器人发送 QQ 私聊或群消息

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::push::channel::{ChannelId, PushChannel};
use crate::push::error::PushError;
use crate::push::formatter::PushMessage;
use crate::push::transport::{expect_code, join_url, send_checked, HttpRequest, HttpTransport};

/// OneBot v11 渠道配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ob11Config {
    /// OneBot HTTP 服务地址
    pub server: String,
    /// access token（可选）
    #[serde(default)]
    pub token: Option<String>,
    /// "private" 或 "group"
    pub send_type: String,
    /// QQ 号或群号
    #[serde(deserialize_with = "string_or_number")]
    pub send_target: String,
}

/// 消息类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendType {
    Private,
    Group,
}

impl SendType {
    pub fn parse(s: &str) -> Result<Self, PushError> {
        match s.trim() {
            "private" => Ok(SendType::Private),
            "group" => Ok(SendType::Group),
            other => Err(PushError::config(format!(
                "ob11 send_type must be \"private\" or \"group\", got {:?}",
                other
            ))),
        }
    }

    fn path(&self) -> &'static str {
        match self {
            SendType::Private => "/send_private_msg",
            SendType::Group => "/send_group_msg",
        }
    }

    fn id_field(&self) -> &'static str {
        match self {
            SendType::Private => "user_id",
            SendType::Group => "group_id",
        }
    }
}

/// OneBot v11 渠道
pub struct Ob11Channel {
    config: Ob11Config,
    transport: Arc<dyn HttpTransport>,
}

impl Ob11Channel {
    pub fn new(config: Ob11Config, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    fn build_request(&self, message: &PushMessage<'_>) -> Result<HttpRequest, PushError> {
        let send_type = SendType::parse(&self.config.send_type)?;

        let mut segments = vec![json!({ "type": "text", "data": { "text": message.body } })];
        if let Some(image) = &message.image_base64 {
            segments.push(json!({
                "type": "image",
                "data": { "file": format!("base64://{}", image) },
            }));
        }

        let mut body = serde_json::Map::new();
        body.insert(send_type.id_field().to_string(), target_value(&self.config.send_target));
        body.insert("message".to_string(), Value::Array(segments));

        let url = join_url(&self.config.server, send_type.path());
        Ok(HttpRequest::post_json(url, Value::Object(body)).bearer(self.config.token.as_deref()))
    }
}

impl PushChannel for Ob11Channel {
    fn id(&self) -> ChannelId {
        ChannelId::Ob11
    }

    fn push(&self, message: &PushMessage<'_>) -> Result<(), PushError> {
        let request = self.build_request(message)?;
        let response = send_checked(self.transport.as_ref(), &request)?;
        expect_code(&response, "retcode", 0)?;
        info!(
            channel = "ob11",
            target = %self.config.send_target,
            order_id = %message.event.order_id,
            "Message sent successfully"
        );
        Ok(())
    }
}

/// 纯数字目标按数字发送，其余按字符串
fn target_value(target: &str) -> Value {
    target
        .trim()
        .parse::<u64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(target))
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "send_target must be a string or number, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::push::event::NotificationEvent;
    use crate::push::formatter::format_for;
    use crate::push::transport::mock::MockTransport;

    fn config(send_type: &str, token: Option<&str>) -> Ob11Config {
        Ob11Config {
            server: "http://127.0.0.1:3000".to_string(),
            token: token.map(|t| t.to_string()),
            send_type: send_type.to_string(),
            send_target: "10001".to_string(),
        }
    }

    #[test]
    fn test_group_message_with_image() {
        let transport = Arc::new(MockTransport::always(200, r#"{"status": "ok", "retcode": 0}"#));
        let event = NotificationEvent::new("42", "t", "b", "u").with_qr_image(b"png".to_vec());
        let channel = Ob11Channel::new(config("group", Some("secret")), transport.clone());

        channel.push(&format_for(ChannelId::Ob11, &event)).unwrap();

        let req = transport.last_request();
        assert_eq!(req.url, "http://127.0.0.1:3000/send_group_msg");
        assert!(req.headers.contains(&("Authorization".to_string(), "Bearer secret".to_string())));
        let body = req.json.unwrap();
        assert_eq!(body["group_id"], 10001);
        assert!(body.get("user_id").is_none());
        assert_eq!(body["message"][0]["type"], "text");
        assert_eq!(body["message"][1]["type"], "image");
        assert_eq!(body["message"][1]["data"]["file"], "base64://cG5n");
    }

    #[test]
    fn test_private_message_without_token_or_image() {
        let transport = Arc::new(MockTransport::always(200, r#"{"retcode": 0}"#));
        let event = NotificationEvent::new("42", "t", "b", "u");
        let channel = Ob11Channel::new(config("private", None), transport.clone());

        channel.push(&format_for(ChannelId::Ob11, &event)).unwrap();

        let req = transport.last_request();
        assert_eq!(req.url, "http://127.0.0.1:3000/send_private_msg");
        assert!(req.headers.is_empty());
        let body = req.json.unwrap();
        assert_eq!(body["user_id"], 10001);
        assert_eq!(body["message"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_nonzero_retcode_is_rejection() {
        let transport =
            Arc::new(MockTransport::always(200, r#"{"status": "failed", "retcode": 100}"#));
        let event = NotificationEvent::new("42", "t", "b", "u");
        let channel = Ob11Channel::new(config("group", None), transport);
        let result = channel.push(&format_for(ChannelId::Ob11, &event));
        assert!(matches!(result, Err(PushError::Rejected(_))));
    }

    #[test]
    fn test_invalid_send_type_fails_before_request() {
        let transport = Arc::new(MockTransport::always(200, r#"{"retcode": 0}"#));
        let event = NotificationEvent::new("42", "t", "b", "u");
        let channel = Ob11Channel::new(config("channel", None), transport.clone());
        let result = channel.push(&format_for(ChannelId::Ob11, &event));
        assert!(result.unwrap_err().is_config_error());
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn test_send_target_accepts_string_or_number() {
        let cfg: Ob11Config = serde_json::from_str(
            r#"{"server": "http://x", "send_type": "group", "send_target": 123}"#,
        )
        .unwrap();
        assert_eq!(cfg.send_target, "123");
        assert!(cfg.token.is_none());

        let cfg: Ob11Config = serde_json::from_str(
            r#"{"server": "http://x", "send_type": "group", "send_target": "abc"}"#,
        )
        .unwrap();
        assert_eq!(target_value(&cfg.send_target), Value::from("abc"));
    }
}
