//! Typed publish/subscribe.

use std::time::Duration;

use tokio::sync::broadcast;

use crate::ToastKind;

/// Who just logged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginNotice {
    pub user_id: String,
    pub username: String,
    pub role: String,
}

/// A request to show a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastRequest {
    pub message: String,
    pub kind: ToastKind,
    /// `None` uses the toast bus default.
    pub duration: Option<Duration>,
}

impl ToastRequest {
    /// Request with the default duration.
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            duration: None,
        }
    }

    /// Override the display duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// Application events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A login or signup completed; auth-dependent views should refresh.
    UserLoggedIn(LoginNotice),
    /// The session was cleared.
    UserLoggedOut,
    /// Show a transient notification.
    ShowToast(ToastRequest),
    /// Reviews for a product changed outside the review panel.
    ReviewsChanged { product_id: String },
}

/// Event bus owned by the application root.
///
/// Cloning yields another handle onto the same channel. Subscribers that fall
/// more than `capacity` events behind lose the oldest ones.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Returns how many subscribers received it.
    pub fn publish(&self, event: AppEvent) -> usize {
        match self.tx.send(event) {
            Ok(n) => n,
            Err(broadcast::error::SendError(event)) => {
                tracing::trace!(?event, "event published with no subscribers");
                0
            }
        }
    }

    /// Publish a toast request.
    pub fn toast(&self, kind: ToastKind, message: impl Into<String>) -> usize {
        self.publish(AppEvent::ShowToast(ToastRequest::new(kind, message)))
    }

    pub fn info(&self, message: impl Into<String>) -> usize {
        self.toast(ToastKind::Info, message)
    }

    pub fn success(&self, message: impl Into<String>) -> usize {
        self.toast(ToastKind::Success, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> usize {
        self.toast(ToastKind::Warning, message)
    }

    pub fn error(&self, message: impl Into<String>) -> usize {
        self.toast(ToastKind::Error, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers_is_ok() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(AppEvent::UserLoggedOut), 0);
    }

    #[tokio::test]
    async fn test_every_subscriber_receives() {
        let bus = EventBus::default();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        assert_eq!(bus.success("Added to cart"), 2);

        let expected = AppEvent::ShowToast(ToastRequest::new(ToastKind::Success, "Added to cart"));
        assert_eq!(a.recv().await.unwrap(), expected);
        assert_eq!(b.recv().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_clones_share_channel() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let other = bus.clone();

        other.publish(AppEvent::ReviewsChanged {
            product_id: "12".to_string(),
        });
        assert!(matches!(
            rx.recv().await.unwrap(),
            AppEvent::ReviewsChanged { product_id } if product_id == "12"
        ));
    }
}
