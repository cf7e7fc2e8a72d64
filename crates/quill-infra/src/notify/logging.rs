//! Notifier that only writes to the log.

use async_trait::async_trait;

use quill_core::ports::Notifier;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn success(&self, message: &str) {
        tracing::info!(notification = "success", "{}", message);
    }

    async fn failure(&self, message: &str) {
        tracing::warn!(notification = "failure", "{}", message);
    }
}
