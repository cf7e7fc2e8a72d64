//! Broadcast notifier - lets any number of listeners follow submission outcomes.
//!
//! Works within a single process only.

use async_trait::async_trait;
use tokio::sync::broadcast;

use quill_core::ports::Notifier;

/// Signal emitted after a submission resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Failure(String),
}

pub struct ChannelNotifier {
    sender: broadcast::Sender<Notification>,
}

impl ChannelNotifier {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            sender: broadcast::channel(buffer_size).0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    fn send(&self, notification: Notification) {
        // Ignore send errors (no subscribers)
        if self.sender.send(notification).is_err() {
            tracing::debug!("No listeners for notification");
        }
    }
}

impl Default for ChannelNotifier {
    fn default() -> Self {
        Self::new(100)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn success(&self, message: &str) {
        self.send(Notification::Success(message.to_string()));
    }

    async fn failure(&self, message: &str) {
        self.send(Notification::Failure(message.to_string()));
    }
}
