//! 推送分发器 - 按顺序调用启用的渠道并汇总结果

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, warn};

use super::channel::{ChannelId, ChannelOutcome};
use super::channels::{build_channel, Backends};
use super::config::PushConfig;
use super::error::PushError;
use super::event::NotificationEvent;
use super::formatter::format_for;

/// 一次分发的结果，每个尝试过的渠道一条
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<ChannelOutcome>,
}

impl DispatchReport {
    /// 所有渠道都成功（没有渠道时也为 true）
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(ChannelOutcome::is_success)
    }

    /// 失败的渠道
    pub fn failures(&self) -> impl Iterator<Item = &ChannelOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// 推送分发器
///
/// 渠道之间互不影响：某个渠道失败（包括 panic）只记为该渠道失败，后续渠道照常推送。
pub struct PushDispatcher {
    backends: Backends,
    /// 是否为 dry-run 模式
    dry_run: bool,
}

impl PushDispatcher {
    pub fn new(backends: Backends) -> Self {
        Self {
            backends,
            dry_run: false,
        }
    }

    /// 使用系统实现和配置中的超时创建
    pub fn from_config(config: &PushConfig) -> Result<Self, PushError> {
        Ok(Self::new(Backends::system(config.http_timeout())?))
    }

    /// 设置 dry-run 模式
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 推送到指定渠道，全部成功时返回 true
    pub fn dispatch(
        &self,
        channels: &[ChannelId],
        config: &PushConfig,
        event: &NotificationEvent,
    ) -> bool {
        self.dispatch_report(channels, config, event).all_succeeded()
    }

    /// 推送到配置中 `push_actions` 列出的渠道
    pub fn dispatch_configured(&self, config: &PushConfig, event: &NotificationEvent) -> bool {
        self.dispatch(&config.push_actions, config, event)
    }

    /// 推送并返回每个渠道的结果
    pub fn dispatch_report(
        &self,
        channels: &[ChannelId],
        config: &PushConfig,
        event: &NotificationEvent,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        let mut seen = HashSet::new();

        for &channel in channels {
            if !seen.insert(channel) {
                debug!(channel = %channel, "Channel listed twice, skipping duplicate");
                continue;
            }

            let result = self.push_one(channel, config, event);
            match &result {
                Ok(()) => debug!(channel = %channel, order_id = %event.order_id, "Push succeeded"),
                Err(e) => warn!(channel = %channel, error = %e, "Push failed"),
            }
            report.outcomes.push(ChannelOutcome { channel, result });
        }

        if !report.is_empty() {
            info!(
                total = report.len(),
                failed = report.failures().count(),
                order_id = %event.order_id,
                "Push dispatch finished"
            );
        }
        report
    }

    fn push_one(
        &self,
        channel: ChannelId,
        config: &PushConfig,
        event: &NotificationEvent,
    ) -> Result<(), PushError> {
        let settings = config.settings(channel)?;

        if self.dry_run {
            info!(channel = %channel, "[DRY-RUN] Would push to channel");
            return Ok(());
        }

        let adapter = build_channel(settings, &self.backends);
        let message = format_for(channel, event);

        panic::catch_unwind(AssertUnwindSafe(|| adapter.push(&message)))
            .unwrap_or_else(|payload| Err(PushError::Panicked(panic_message(payload.as_ref()))))
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// 便捷函数：使用系统实现推送，全部成功时返回 true
///
/// 不会返回错误或 panic；HTTP 客户端无法创建时所有启用的渠道都记为失败。
pub fn dispatch(channels: &[ChannelId], config: &PushConfig, event: &NotificationEvent) -> bool {
    if channels.is_empty() {
        return true;
    }
    match PushDispatcher::from_config(config) {
        Ok(dispatcher) => dispatcher.dispatch(channels, config, event),
        Err(e) => {
            warn!(error = %e, "Cannot initialise push backends");
            false
        }
    }
}
