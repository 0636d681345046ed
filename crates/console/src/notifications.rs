//! Depth-one notification slot with a fixed visible lifetime.
//!
//! [`NotificationSink::notify`] replaces whatever is showing (last writer
//! wins). Expiry is evaluated lazily: [`NotificationSink::current`] returns
//! `None` once the lifetime has elapsed, so no timer task is needed. Every
//! notification is also published on a broadcast channel for front ends.

use std::time::Duration;

use scriptdeck_core::notification::{Notification, NotificationKind};
use tokio::sync::{broadcast, RwLock};
use tokio::time::Instant;

/// Default capacity of the broadcast channel.
const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug)]
struct Slot {
    notification: Notification,
    raised_at: Instant,
}

#[derive(Debug)]
pub struct NotificationSink {
    slot: RwLock<Option<Slot>>,
    ttl: Duration,
    sender: broadcast::Sender<Notification>,
}

impl NotificationSink {
    pub fn new(ttl: Duration) -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self {
            slot: RwLock::new(None),
            ttl,
            sender,
        }
    }

    /// Show `message`, replacing the current notification.
    pub async fn notify(&self, message: impl Into<String>, kind: NotificationKind) {
        let notification = Notification::new(message, kind);
        tracing::debug!(kind = %kind, message = %notification.message, "Notification raised");

        *self.slot.write().await = Some(Slot {
            notification: notification.clone(),
            raised_at: Instant::now(),
        });

        // No subscribers is fine.
        let _ = self.sender.send(notification);
    }

    pub async fn info(&self, message: impl Into<String>) {
        self.notify(message, NotificationKind::Info).await;
    }

    pub async fn success(&self, message: impl Into<String>) {
        self.notify(message, NotificationKind::Success).await;
    }

    pub async fn warning(&self, message: impl Into<String>) {
        self.notify(message, NotificationKind::Warning).await;
    }

    pub async fn error(&self, message: impl Into<String>) {
        self.notify(message, NotificationKind::Error).await;
    }

    /// The visible notification, if one was raised within the lifetime.
    pub async fn current(&self) -> Option<Notification> {
        let slot = self.slot.read().await;
        slot.as_ref()
            .filter(|s| s.raised_at.elapsed() < self.ttl)
            .map(|s| s.notification.clone())
    }

    /// Dismiss the current notification early.
    pub async fn dismiss(&self) {
        *self.slot.write().await = None;
    }

    /// Receive every notification raised from now on.
    ///
    /// A subscriber that falls behind by more than the channel capacity
    /// gets `RecvError::Lagged` and loses the oldest messages.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}
