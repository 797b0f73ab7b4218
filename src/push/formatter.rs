//! 消息格式化 - 把事件字段渲染成各渠道的标题、正文和跳转链接

use super::channel::ChannelId;
use super::event::NotificationEvent;

/// 通知标题
pub const HEADLINE: &str = "【BHYG】锁票成功，尽快支付";

/// 订单详情页
const ORDER_DETAIL_URL: &str = "https://mall.bilibili.com/neul-next/ticket/orderDetail.html";

/// 桌面通知中票名的最大长度（字符数）
pub const DESKTOP_TICKET_NAME_MAX: usize = 45;
const DESKTOP_TICKET_HEAD: usize = 12;
const DESKTOP_TICKET_TAIL: usize = 30;

/// 渲染完成、可直接投递的消息
#[derive(Debug, Clone)]
pub struct PushMessage<'a> {
    /// 标题（部分渠道不使用）
    pub title: String,
    /// 正文
    pub body: String,
    /// 点击后的跳转链接
    pub jump_url: Option<String>,
    /// 二维码图片的 base64（仅 OneBot 使用）
    pub image_base64: Option<String>,
    /// 原始事件
    pub event: &'a NotificationEvent,
}

/// 订单详情页 URL
pub fn order_detail_url(order_id: &str) -> String {
    format!("{}?order_id={}", ORDER_DETAIL_URL, order_id)
}

/// App 内 webview 打开订单页（Gotify 使用）
pub fn app_webview_url(order_id: &str) -> String {
    format!("bilibili://mall/web?url={}", order_detail_url(order_id))
}

/// App 内浏览器打开订单页（Bark / ntfy 使用）
pub fn app_browser_url(order_id: &str) -> String {
    format!("bilibili://browser?url={}", order_detail_url(order_id))
}

/// 截断过长的票名，避免系统通知正文过长
///
/// 超过 45 个字符时保留前 12 个和后 30 个字符，中间以 `...` 连接。
pub fn truncate_ticket_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= DESKTOP_TICKET_NAME_MAX {
        return name.to_string();
    }
    let head: String = chars[..DESKTOP_TICKET_HEAD].iter().collect();
    let tail: String = chars[chars.len() - DESKTOP_TICKET_TAIL..].iter().collect();
    format!("{}...{}", head, tail)
}

/// 按渠道渲染消息
pub fn format_for(channel: ChannelId, event: &NotificationEvent) -> PushMessage<'_> {
    let NotificationEvent {
        order_id,
        ticket_name,
        buyer_name,
        username,
        ..
    } = event;

    let details = format!(
        "票名: {}\n购票人: {}\n用户: {}\n订单ID: {}",
        ticket_name, buyer_name, username, order_id
    );

    let (title, body, jump_url, image_base64) = match channel {
        ChannelId::Gotify => (
            HEADLINE.to_string(),
            format!("{}，点击跳转\n{}", HEADLINE, details),
            Some(app_webview_url(order_id)),
            None,
        ),
        ChannelId::Ob11 => (
            HEADLINE.to_string(),
            format!(
                "{}。\n{}\n{}\n可扫描下方二维码支付",
                HEADLINE,
                details,
                order_detail_url(order_id)
            ),
            None,
            event.qr_base64(),
        ),
        ChannelId::Bark => (
            HEADLINE.to_string(),
            format!("{}，点击跳转\n{}", HEADLINE, details),
            Some(app_browser_url(order_id)),
            None,
        ),
        // 提示语放 title：ntfy 客户端折叠通知时只显示标题
        ChannelId::Ntfy => (
            format!("{}。", HEADLINE),
            details,
            Some(app_browser_url(order_id)),
            None,
        ),
        ChannelId::DesktopNotify => (
            format!("{}。", HEADLINE),
            format!(
                "票名: {}\n购票人: {} 用户: {}\n订单ID: {}",
                truncate_ticket_name(ticket_name),
                buyer_name,
                username,
                order_id
            ),
            None,
            None,
        ),
        ChannelId::Pushplus | ChannelId::ServerChan => (
            format!("{}。", HEADLINE),
            format!(
                "票名: {}\n购票人: {}\n用户: {}\n订单ID：{}\n{}",
                ticket_name,
                buyer_name,
                username,
                order_id,
                order_detail_url(order_id)
            ),
            None,
            None,
        ),
        ChannelId::RunCommand => (String::new(), String::new(), None, None),
    };

    PushMessage {
        title,
        body,
        jump_url,
        image_base64,
        event,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(ticket_name: &str) -> NotificationEvent {
        NotificationEvent::new("1001", ticket_name, "张三", "bob")
    }

    #[test]
    fn test_truncate_long_ticket_name() {
        let name: String = ('a'..='z').chain('A'..='X').collect();
        assert_eq!(name.chars().count(), 50);

        let truncated = truncate_ticket_name(&name);
        let expected = format!("{}...{}", &name[..12], &name[20..]);
        assert_eq!(truncated, expected);
        assert_eq!(truncated.chars().count(), 45);
    }

    #[test]
    fn test_truncate_keeps_short_names() {
        let name = "x".repeat(45);
        assert_eq!(truncate_ticket_name(&name), name);
        assert_eq!(truncate_ticket_name("演唱会"), "演唱会");
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let name = "票".repeat(46);
        let truncated = truncate_ticket_name(&name);
        assert_eq!(truncated, format!("{}...{}", "票".repeat(12), "票".repeat(30)));
    }

    #[test]
    fn test_desktop_message_uses_truncated_name() {
        let long = "L".repeat(60);
        let ev = event(&long);
        let msg = format_for(ChannelId::DesktopNotify, &ev);
        assert!(msg.body.contains(&truncate_ticket_name(&long)));
        assert!(!msg.body.contains(&long));

        // 其他渠道保留完整票名
        let msg = format_for(ChannelId::Bark, &ev);
        assert!(msg.body.contains(&long));
    }

    #[test]
    fn test_jump_url_only_for_clickable_channels() {
        let ev = event("t");
        for id in ChannelId::ALL {
            let clickable = matches!(id, ChannelId::Gotify | ChannelId::Bark | ChannelId::Ntfy);
            assert_eq!(format_for(id, &ev).jump_url.is_some(), clickable, "{}", id);
        }
        assert!(format_for(ChannelId::Ob11, &ev).body.contains("orderDetail.html?order_id=1001"));
    }

    #[test]
    fn test_jump_urls() {
        let ev = event("t");
        let detail = "https://mall.bilibili.com/neul-next/ticket/orderDetail.html?order_id=1001";
        assert_eq!(
            format_for(ChannelId::Gotify, &ev).jump_url,
            Some(format!("bilibili://mall/web?url={}", detail))
        );
        assert_eq!(
            format_for(ChannelId::Ntfy, &ev).jump_url,
            Some(format!("bilibili://browser?url={}", detail))
        );
    }

    #[test]
    fn test_ob11_message_carries_image() {
        let ev = event("t").with_qr_image(b"png".to_vec());
        let msg = format_for(ChannelId::Ob11, &ev);
        assert_eq!(msg.image_base64.as_deref(), Some("cG5n"));
        assert!(msg.body.ends_with("可扫描下方二维码支付"));
        assert!(msg.body.contains("order_id=1001"));
    }

    #[test]
    fn test_pushplus_content() {
        let ev = event("演唱会");
        let msg = format_for(ChannelId::Pushplus, &ev);
        assert_eq!(msg.title, "【BHYG】锁票成功，尽快支付。");
        assert!(msg.body.starts_with("票名: 演唱会\n购票人: 张三\n用户: bob\n订单ID：1001\n"));
    }
}
