use notify_rust::{Hint, Notification, Timeout};

use crate::refresh::notice::{Notice, NoticeKind, NotificationSink};

const APP_NAME: &str = "inboxpert";

/// Shows each refresh notice as a desktop notification.
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    pub fn new() -> Self {
        Self
    }

    fn build(&self, notice: &Notice) -> Notification {
        let mut n = Notification::new();
        n.appname(APP_NAME)
            .summary(&notice.title)
            .body(&notice.message)
            .hint(Hint::Category("email".to_string()))
            .timeout(Timeout::Milliseconds(notice.display_for().as_millis() as u32));
        if notice.kind == NoticeKind::Failure {
            n.icon("dialog-error");
        }
        n
    }
}

impl NotificationSink for DesktopNotifier {
    fn notify(&self, notice: &Notice) {
        // A missing notification daemon must not stop the refresh loop.
        if let Err(e) = self.build(notice).show() {
            log::warn!("desktop notification failed: {e}");
        }
    }
}
