//! # Notification Channel
//!
//! Operator-visible notifications (the toast stream). Persistence and
//! network failures never bubble up as exceptions into UI handlers —
//! they are converted into notifications here, and the in-memory cart
//! stays authoritative.

use tokio::sync::mpsc;
use tracing::debug;

/// Severity of a notification, mapped to toast styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One operator-visible notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,

    /// Set when the session expired: the UI redirects to the login
    /// flow after a short delay instead of just showing the toast.
    pub redirect_to_login: bool,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Info,
            message: message.into(),
            redirect_to_login: false,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Success,
            message: message.into(),
            redirect_to_login: false,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Warning,
            message: message.into(),
            redirect_to_login: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Error,
            message: message.into(),
            redirect_to_login: false,
        }
    }

    pub fn auth_expired() -> Self {
        Notification {
            level: NotificationLevel::Error,
            message: "Session expired, redirecting to login".to_string(),
            redirect_to_login: true,
        }
    }
}

/// Cloneable sender side of the notification stream.
///
/// Dropping every receiver must never break persistence, so sends are
/// best-effort: an unconsumed notification is logged and discarded.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    /// Creates the notification channel.
    pub fn channel() -> (Notifier, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Notifier { tx }, rx)
    }

    /// Emits a notification.
    pub fn notify(&self, notification: Notification) {
        if self.tx.send(notification.clone()).is_err() {
            debug!(?notification, "Notification dropped (no receiver)");
        }
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.notify(Notification::warning(message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(Notification::error(message));
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(Notification::success(message));
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notifications_flow_through() {
        let (notifier, mut rx) = Notifier::channel();
        notifier.warning("sync failed");

        let received = rx.recv().await.unwrap();
        assert_eq!(received.level, NotificationLevel::Warning);
        assert_eq!(received.message, "sync failed");
        assert!(!received.redirect_to_login);
    }

    #[tokio::test]
    async fn test_send_without_receiver_is_harmless() {
        let (notifier, rx) = Notifier::channel();
        drop(rx);
        notifier.error("nobody is listening");
    }

    #[test]
    fn test_auth_expired_sets_redirect() {
        assert!(Notification::auth_expired().redirect_to_login);
    }
}
