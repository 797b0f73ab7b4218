//! 锁票成功推送 - 统一管理所有推送渠道
//!
//! # 设计目标
//! 1. 统一接口：所有渠道实现 `PushChannel` trait
//! 2. 渠道隔离：单个渠道失败不影响其他渠道
//! 3. 封闭渠道集合：`ChannelId` / `ChannelSettings` 穷尽匹配
//! 4. 可测试：HTTP、桌面通知、进程执行都通过 `Backends` 注入
//!
//! # 使用示例
//! ```ignore
//! use bhyg_push::push::{NotificationEvent, PushConfig, PushDispatcher};
//!
//! let config = PushConfig::auto_load()?;
//! let dispatcher = PushDispatcher::from_config(&config)?;
//! let event = NotificationEvent::new("1234567", "演唱会 VIP", "张三", "bob");
//! let all_ok = dispatcher.dispatch_configured(&config, &event);
//! ```

pub mod channel;
pub mod channels;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod formatter;
pub mod transport;

pub use channel::{ChannelId, ChannelOutcome, PushChannel};
pub use channels::Backends;
pub use config::{ChannelSettings, PushConfig};
pub use dispatcher::{dispatch, DispatchReport, PushDispatcher};
pub use error::PushError;
pub use event::NotificationEvent;
pub use formatter::{format_for, truncate_ticket_name, PushMessage};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
