//! BHYG Push - 锁票成功后的多渠道推送

pub mod logging;
pub mod push;

pub use logging::init_logging;
pub use push::{
    dispatch, Backends, ChannelId, ChannelOutcome, ChannelSettings, DispatchReport,
    NotificationEvent, PushChannel, PushConfig, PushDispatcher, PushError,
};
