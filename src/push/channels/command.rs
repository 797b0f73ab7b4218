//! 命令执行渠道
//!
//! 模板中的 `ORDER_ID`、`TICKET_NAME`、`BUYER_NAME`、`USERNAME` 会被替换为事件字段。
//! 模板先按空白切分为参数列表再替换，事件字段始终作为单个参数传给进程，
//! 不经过 shell，因此票名或用户名中的 shell 元字符不会被解释。

use serde::{Deserialize, Serialize};
use std::process::{Command, Stdio};
use std::sync::Arc;
use tracing::{debug, info};

use crate::push::channel::{ChannelId, PushChannel};
use crate::push::error::PushError;
use crate::push::event::NotificationEvent;
use crate::push::formatter::PushMessage;

/// 命令渠道配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunCommandConfig {
    /// 命令模板，如 `notify-me ORDER_ID USERNAME`
    pub command: String,
}

/// 进程执行抽象
pub trait CommandRunner: Send + Sync {
    /// 执行 argv 并等待结束，非零退出码视为失败
    fn run(&self, argv: &[String]) -> Result<(), PushError>;
}

/// 直接启动子进程的实现
#[derive(Debug, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, argv: &[String]) -> Result<(), PushError> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| PushError::config("empty command"))?;

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| PushError::local(format!("failed to launch {}: {}", program, e)))?;

        debug!(
            program = %program,
            status = %output.status,
            stdout = %String::from_utf8_lossy(&output.stdout).trim(),
            "Command finished"
        );

        if output.status.success() {
            Ok(())
        } else {
            Err(PushError::local(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}

/// 占位符替换（字面替换，不做转义）
pub fn render_command(template: &str, event: &NotificationEvent) -> String {
    template
        .replace("ORDER_ID", &event.order_id)
        .replace("TICKET_NAME", &event.ticket_name)
        .replace("BUYER_NAME", &event.buyer_name)
        .replace("USERNAME", &event.username)
}

/// 切分模板并逐个参数替换
pub fn build_argv(template: &str, event: &NotificationEvent) -> Result<Vec<String>, PushError> {
    let argv: Vec<String> = template
        .split_whitespace()
        .map(|token| render_command(token, event))
        .collect();
    if argv.is_empty() {
        return Err(PushError::config("run_command template is empty"));
    }
    Ok(argv)
}

/// 命令执行渠道
pub struct CommandChannel {
    config: RunCommandConfig,
    runner: Arc<dyn CommandRunner>,
}

impl CommandChannel {
    pub fn new(config: RunCommandConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }
}

impl PushChannel for CommandChannel {
    fn id(&self) -> ChannelId {
        ChannelId::RunCommand
    }

    fn push(&self, message: &PushMessage<'_>) -> Result<(), PushError> {
        let argv = build_argv(&self.config.command, message.event)?;
        debug!(
            channel = "run_command",
            command = %render_command(&self.config.command, message.event),
            "Running command"
        );
        self.runner.run(&argv)?;
        info!(channel = "run_command", program = %argv[0], "Command completed");
        Ok(())
    }
}
