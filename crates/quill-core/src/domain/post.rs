use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::draft::NormalizedDraft;

/// Rendering used for the frozen display timestamp, e.g. `29/01/24, 10:00 pm`.
pub const DISPLAY_FORMAT: &str = "%d/%m/%y, %I:%M %P";

/// Post identifier.
///
/// New posts get a UUID v7. Ids already in storage are kept verbatim whatever
/// their shape, e.g. millisecond timestamps like `"1706565600000"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PostId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for PostId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Publication state of a post. Only ever moves from `Scheduled` to `Published`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Scheduled,
    Published,
}

/// Post entity - a piece of text waiting for, or past, its publish time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    /// Rendered once at creation and never recomputed.
    #[serde(rename = "timestamp")]
    pub display_timestamp: String,
    pub content: String,
    pub scheduled_time: DateTime<Utc>,
    pub status: PostStatus,
}

impl Post {
    /// Create a post from a validated draft.
    ///
    /// Drafts whose time has already arrived are published straight away.
    pub fn new(draft: NormalizedDraft, now: DateTime<Utc>, zone: &FixedOffset) -> Self {
        let status = if draft.scheduled_time <= now {
            PostStatus::Published
        } else {
            PostStatus::Scheduled
        };

        Self {
            id: PostId::generate(),
            display_timestamp: display_timestamp(draft.scheduled_time, zone),
            content: draft.content,
            scheduled_time: draft.scheduled_time,
            status,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Scheduled and past its publish time.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == PostStatus::Scheduled && self.scheduled_time <= now
    }

    /// Copy of this post in the published state; every other field is kept.
    pub fn published(&self) -> Self {
        Self {
            status: PostStatus::Published,
            ..self.clone()
        }
    }
}

/// Render an instant the way the feed shows it, in the given offset.
pub fn display_timestamp(at: DateTime<Utc>, zone: &FixedOffset) -> String {
    at.with_timezone(zone).format(DISPLAY_FORMAT).to_string()
}
