//! Notification port - tells the user how a submission resolved.

use async_trait::async_trait;

/// Receiver of submission outcome signals.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn success(&self, message: &str);

    async fn failure(&self, message: &str);
}
