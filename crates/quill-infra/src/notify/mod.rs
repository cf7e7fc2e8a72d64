//! Notifier implementations - log only, and broadcast to listeners.

mod channel;
mod logging;

pub use channel::{ChannelNotifier, Notification};
pub use logging::LogNotifier;
