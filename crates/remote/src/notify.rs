//! Toast notification channel.
//!
//! Every component surfaces its own user-visible outcome through one
//! global `notify(message, kind)` sink. Delivery is fire-and-forget: no
//! acknowledgement, and no queuing guarantee beyond the channel capacity
//! of the toast widget consuming the stream.

use tokio::sync::broadcast;

/// Severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

/// One toast message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity shown to the user.
    pub kind: NotificationKind,
    /// Message text.
    pub message: String,
}

/// Handle for emitting toasts. Cheap to clone; all clones feed the same
/// stream.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    /// Buffered toasts before the slowest subscriber starts losing them.
    const CAPACITY: usize = 64;

    /// Create a notifier with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(Self::CAPACITY);
        Self { tx }
    }

    /// Subscribe to the toast stream.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Emit a toast. A send with no subscribers is silently dropped.
    pub fn notify(&self, kind: NotificationKind, message: impl Into<String>) {
        let _ = self.tx.send(Notification {
            kind,
            message: message.into(),
        });
    }

    /// Emit a success toast.
    pub fn success(&self, message: impl Into<String>) {
        self.notify(NotificationKind::Success, message);
    }

    /// Emit an error toast.
    pub fn error(&self, message: impl Into<String>) {
        self.notify(NotificationKind::Error, message);
    }

    /// Emit a warning toast.
    pub fn warning(&self, message: impl Into<String>) {
        self.notify(NotificationKind::Warning, message);
    }

    /// Emit an info toast.
    pub fn info(&self, message: impl Into<String>) {
        self.notify(NotificationKind::Info, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_toasts_in_order() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        notifier.success("saved");
        notifier.error("failed");

        let first = rx.recv().await.expect("first toast");
        assert_eq!(first.kind, NotificationKind::Success);
        assert_eq!(first.message, "saved");

        let second = rx.recv().await.expect("second toast");
        assert_eq!(second.kind, NotificationKind::Error);
    }

    #[test]
    fn notifying_without_subscribers_does_not_panic() {
        Notifier::new().info("nobody is listening");
    }
}
