//! 桌面通知渠道
//!
//! 通知通过 `notify-rust` 发送（Linux 走 D-Bus，macOS/Windows 走系统通知中心）；
//! Linux 上 D-Bus 不可用时退回 `notify-send` 命令。
//!
//! 开启 `need_sound` 时在后台线程播放提示音，播放结果只记录日志。

use notify_rust::Notification;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

use crate::push::channel::{ChannelId, PushChannel};
use crate::push::error::PushError;
use crate::push::formatter::PushMessage;

/// 通知显示的应用名
const APP_NAME: &str = "BHYG";

/// Windows 播放音频时传递路径的环境变量
const SOUND_ENV: &str = "BHYG_SOUND_PATH";

/// 桌面通知渠道配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DesktopNotifyConfig {
    /// 是否播放提示音
    #[serde(default)]
    pub need_sound: bool,
    /// 提示音文件路径
    #[serde(default)]
    pub sound_path: Option<PathBuf>,
}

/// 本地通知与音频播放
pub trait DesktopNotifier: Send + Sync {
    /// 弹出系统通知
    fn notify(&self, title: &str, body: &str) -> Result<(), PushError>;

    /// 播放音频文件（阻塞直到播放结束）
    fn play_sound(&self, path: &Path) -> Result<(), PushError>;
}

/// 系统实现：`notify-rust` 弹通知，系统播放器放提示音
#[derive(Debug, Default)]
pub struct SystemNotifier;

impl SystemNotifier {
    pub fn new() -> Self {
        Self
    }

    fn notify_send(title: &str, body: &str) -> Result<(), PushError> {
        let program = which::which("notify-send")
            .map_err(|e| PushError::local(format!("notify-send not found: {}", e)))?;
        let app_name = format!("--app-name={}", APP_NAME);
        let output = Command::new(program)
            .args([app_name.as_str(), title, body])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| PushError::local(format!("failed to launch notify-send: {}", e)))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(PushError::local(format!(
                "notify-send exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }

    fn sound_command(path: &Path) -> Result<Command, PushError> {
        if cfg!(target_os = "macos") {
            let mut cmd = Command::new("afplay");
            cmd.arg(path);
            Ok(cmd)
        } else if cfg!(target_os = "windows") {
            // 路径经环境变量传入，脚本本身不拼接用户数据
            let script = format!("(New-Object Media.SoundPlayer $env:{}).PlaySync()", SOUND_ENV);
            let mut cmd = Command::new("powershell");
            cmd.args(["-NoProfile", "-Command", &script]).env(SOUND_ENV, path);
            Ok(cmd)
        } else {
            let candidates = linux_players(path);
            let (name, program) = candidates
                .iter()
                .find_map(|name| which::which(name).ok().map(|p| (*name, p)))
                .ok_or_else(|| {
                    PushError::local(format!("no audio player found ({})", candidates.join("/")))
                })?;
            let mut cmd = Command::new(program);
            if name == "ffplay" {
                cmd.args(["-nodisp", "-autoexit", "-loglevel", "quiet"]);
            }
            cmd.arg(path);
            Ok(cmd)
        }
    }
}

/// Linux 播放器候选，按优先级排列
///
/// `aplay` 只能播放 WAV，其他格式优先交给 `ffplay`。
fn linux_players(path: &Path) -> &'static [&'static str] {
    let is_wav = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
    if is_wav {
        &["paplay", "aplay", "ffplay"]
    } else {
        &["ffplay", "paplay"]
    }
}

impl DesktopNotifier for SystemNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), PushError> {
        let shown = Notification::new()
            .appname(APP_NAME)
            .summary(title)
            .body(body)
            .show()
            .map(|_| ());

        match shown {
            Ok(()) => Ok(()),
            Err(e) if cfg!(all(unix, not(target_os = "macos"))) => {
                debug!(error = %e, "notify-rust failed, falling back to notify-send");
                Self::notify_send(title, body)
            }
            Err(e) => Err(PushError::local(format!("desktop notification failed: {}", e))),
        }
    }

    fn play_sound(&self, path: &Path) -> Result<(), PushError> {
        if !path.exists() {
            return Err(PushError::local(format!("sound file not found: {}", path.display())));
        }
        let status = Self::sound_command(path)?
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| PushError::local(format!("failed to launch audio player: {}", e)))?;
        if status.success() {
            Ok(())
        } else {
            Err(PushError::local(format!("audio player exited with {}", status)))
        }
    }
}

/// 桌面通知渠道
pub struct DesktopChannel {
    config: DesktopNotifyConfig,
    notifier: Arc<dyn DesktopNotifier>,
}

impl DesktopChannel {
    pub fn new(config: DesktopNotifyConfig, notifier: Arc<dyn DesktopNotifier>) -> Self {
        Self { config, notifier }
    }

    /// 后台播放提示音，不等待结果
    ///
    /// 播放失败不影响通知本身的结果。
    fn spawn_sound(&self) -> Option<thread::JoinHandle<()>> {
        let Some(path) = self.config.sound_path.clone() else {
            warn!(channel = "desktop_notify", "need_sound is set but sound_path is empty");
            return None;
        };
        let notifier = Arc::clone(&self.notifier);
        debug!(channel = "desktop_notify", path = %path.display(), "Playing sound");

        let spawned = thread::Builder::new()
            .name("push-sound".to_string())
            .spawn(move || {
                if let Err(e) = notifier.play_sound(&path) {
                    warn!(channel = "desktop_notify", error = %e, "Sound playback failed");
                }
            });
        match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(channel = "desktop_notify", error = %e, "Cannot spawn sound thread");
                None
            }
        }
    }
}

impl PushChannel for DesktopChannel {
    fn id(&self) -> ChannelId {
        ChannelId::DesktopNotify
    }

    fn push(&self, message: &PushMessage<'_>) -> Result<(), PushError> {
        self.notifier.notify(&message.title, &message.body)?;
        info!(channel = "desktop_notify", "Desktop notification shown");

        if self.config.need_sound {
            // detached: handle dropped on purpose
            drop(self.spawn_sound());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::push::event::NotificationEvent;
    use crate::push::formatter::format_for;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::sync::Mutex;
    use std::time::Duration;

    /// 测试用的 mock 通知器
    struct MockNotifier {
        notify_ok: bool,
        sound_ok: bool,
        notified: Mutex<Vec<(String, String)>>,
        sound_calls: AtomicUsize,
        sound_done: Mutex<Option<mpsc::Sender<()>>>,
    }

    impl MockNotifier {
        fn new(notify_ok: bool, sound_ok: bool) -> Self {
            Self {
                notify_ok,
                sound_ok,
                notified: Mutex::new(Vec::new()),
                sound_calls: AtomicUsize::new(0),
                sound_done: Mutex::new(None),
            }
        }
    }

    impl DesktopNotifier for MockNotifier {
        fn notify(&self, title: &str, body: &str) -> Result<(), PushError> {
            self.notified.lock().unwrap().push((title.to_string(), body.to_string()));
            if self.notify_ok {
                Ok(())
            } else {
                Err(PushError::local("no display"))
            }
        }

        fn play_sound(&self, _path: &Path) -> Result<(), PushError> {
            self.sound_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(tx) = self.sound_done.lock().unwrap().take() {
                let _ = tx.send(());
            }
            if self.sound_ok {
                Ok(())
            } else {
                Err(PushError::local("no audio device"))
            }
        }
    }

    fn config(need_sound: bool) -> DesktopNotifyConfig {
        DesktopNotifyConfig {
            need_sound,
            sound_path: Some(PathBuf::from("/tmp/alert.mp3")),
        }
    }

    #[test]
    fn test_notify_without_sound() {
        let notifier = Arc::new(MockNotifier::new(true, true));
        let channel = DesktopChannel::new(config(false), notifier.clone());
        let event = NotificationEvent::new("42", "演唱会", "张三", "bob");

        channel.push(&format_for(ChannelId::DesktopNotify, &event)).unwrap();

        let notified = notifier.notified.lock().unwrap();
        assert_eq!(notified.len(), 1);
        assert_eq!(notified[0].0, "【BHYG】锁票成功，尽快支付。");
        assert!(notified[0].1.contains("购票人: 张三 用户: bob"));
        assert_eq!(notifier.sound_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_sound_failure_does_not_fail_channel() {
        let notifier = Arc::new(MockNotifier::new(true, false));
        let (tx, rx) = mpsc::channel();
        *notifier.sound_done.lock().unwrap() = Some(tx);

        let channel = DesktopChannel::new(config(true), notifier.clone());
        let event = NotificationEvent::new("42", "t", "b", "u");
        assert!(channel.push(&format_for(ChannelId::DesktopNotify, &event)).is_ok());

        rx.recv_timeout(Duration::from_secs(5)).expect("sound thread should run");
        assert_eq!(notifier.sound_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_notify_failure_fails_channel() {
        let notifier = Arc::new(MockNotifier::new(false, true));
        let channel = DesktopChannel::new(config(true), notifier.clone());
        let event = NotificationEvent::new("42", "t", "b", "u");
        let result = channel.push(&format_for(ChannelId::DesktopNotify, &event));
        assert!(matches!(result, Err(PushError::LocalExecution(_))));
        assert_eq!(notifier.sound_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_sound_path_skips_playback() {
        let notifier = Arc::new(MockNotifier::new(true, true));
        let channel = DesktopChannel::new(
            DesktopNotifyConfig { need_sound: true, sound_path: None },
            notifier.clone(),
        );
        assert!(channel.spawn_sound().is_none());
    }

    #[test]
    fn test_non_wav_sound_prefers_ffplay() {
        let players = linux_players(Path::new("/tmp/alert.mp3"));
        assert_eq!(players[0], "ffplay");
        assert!(!players.contains(&"aplay"));
    }

    #[test]
    fn test_wav_sound_keeps_native_players() {
        assert_eq!(linux_players(Path::new("/tmp/alert.WAV")), &["paplay", "aplay", "ffplay"]);
    }

    #[cfg(target_os = "windows")]
    #[test]
    fn test_windows_sound_path_is_not_in_script() {
        let path = Path::new(r"C:\sounds\it's.wav");
        let cmd = SystemNotifier::sound_command(path).unwrap();
        assert!(cmd.get_args().all(|arg| !arg.to_string_lossy().contains("it's")));
        assert!(cmd
            .get_envs()
            .any(|(key, value)| key == SOUND_ENV && value == Some(path.as_os_str())));
    }
}
