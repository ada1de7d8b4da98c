//! Periodic refresh of the feed and the state consumers render from.

pub mod controller;
pub mod notice;

pub use controller::{DEFAULT_INTERVAL, Phase, RefreshController, Snapshot};
pub use notice::{ChannelSink, LogSink, Notice, NoticeKind, NotificationSink};
