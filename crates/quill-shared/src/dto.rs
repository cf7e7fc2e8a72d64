//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quill_core::{Post, PostStatus};

/// Request to schedule a new post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPostRequest {
    #[serde(default)]
    pub content: String,
    /// RFC 3339, or a zone-less `YYYY-MM-DDTHH:MM` local time.
    #[serde(default)]
    pub scheduled_time: Option<String>,
}

/// A post as stored, including its status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub timestamp: String,
    pub content: String,
    pub scheduled_time: DateTime<Utc>,
    pub status: PostStatus,
}

impl From<&Post> for PostResponse {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.to_string(),
            timestamp: post.display_timestamp.clone(),
            content: post.content.clone(),
            scheduled_time: post.scheduled_time,
            status: post.status,
        }
    }
}

/// One entry of the published feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    pub id: String,
    pub timestamp: String,
    pub content: String,
    pub scheduled_time: DateTime<Utc>,
}

impl From<&Post> for FeedEntry {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.to_string(),
            timestamp: post.display_timestamp.clone(),
            content: post.content.clone(),
            scheduled_time: post.scheduled_time,
        }
    }
}
