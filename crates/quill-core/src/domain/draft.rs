use chrono::{DateTime, Utc};

/// Unvalidated submission, as sent by the compose form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub content: String,
    /// Either RFC 3339, or a local `YYYY-MM-DDTHH:MM` date-and-time value.
    pub scheduled_time: Option<String>,
}

impl Draft {
    pub fn new(content: impl Into<String>, scheduled_time: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            scheduled_time: Some(scheduled_time.into()),
        }
    }
}

/// A draft that passed validation: trimmed content and an absolute publish time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDraft {
    pub content: String,
    pub scheduled_time: DateTime<Utc>,
}
