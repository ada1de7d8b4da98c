use std::sync::mpsc::Sender;
use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Failure,
}

/// Transient message produced by every applied refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn synced(count: usize) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: "Data Synced".to_string(),
            message: format!("Updated {count} emails from the feed"),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Failure,
            title: "Sync Failed".to_string(),
            message: message.into(),
        }
    }

    /// How long a toast for this notice stays on screen.
    pub fn display_for(&self) -> Duration {
        match self.kind {
            NoticeKind::Success => Duration::from_secs(3),
            NoticeKind::Failure => Duration::from_secs(5),
        }
    }
}

pub trait NotificationSink: Send {
    fn notify(&self, notice: &Notice);
}

/// Forwards notices over a channel; a dropped receiver is ignored.
pub struct ChannelSink(Sender<Notice>);

impl ChannelSink {
    pub fn new(tx: Sender<Notice>) -> Self {
        Self(tx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, notice: &Notice) {
        let _ = self.0.send(notice.clone());
    }
}

pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, notice: &Notice) {
        match notice.kind {
            NoticeKind::Success => log::info!("{}: {}", notice.title, notice.message),
            NoticeKind::Failure => log::warn!("{}: {}", notice.title, notice.message),
        }
    }
}
