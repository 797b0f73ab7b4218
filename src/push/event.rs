//! 锁票成功事件

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::error::PushError;

/// 一次锁票成功事件，分发期间只读
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    /// 订单 ID
    pub order_id: String,
    /// 票名
    pub ticket_name: String,
    /// 购票人
    pub buyer_name: String,
    /// 用户名
    pub username: String,
    /// 支付二维码图片（原始字节）
    pub qr_image: Option<Vec<u8>>,
}

impl NotificationEvent {
    pub fn new(
        order_id: impl Into<String>,
        ticket_name: impl Into<String>,
        buyer_name: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            ticket_name: ticket_name.into(),
            buyer_name: buyer_name.into(),
            username: username.into(),
            qr_image: None,
        }
    }

    /// 附加二维码图片
    pub fn with_qr_image(mut self, image: Vec<u8>) -> Self {
        self.qr_image = Some(image);
        self
    }

    /// 从 base64 字符串附加二维码图片，内容必须能解码
    pub fn with_qr_base64(mut self, encoded: &str) -> Result<Self, PushError> {
        let image = STANDARD
            .decode(encoded.trim())
            .map_err(|e| PushError::config(format!("invalid base64 QR image: {}", e)))?;
        self.qr_image = Some(image);
        Ok(self)
    }

    /// 二维码图片的 base64 编码
    pub fn qr_base64(&self) -> Option<String> {
        self.qr_image.as_ref().map(|img| STANDARD.encode(img))
    }
}
