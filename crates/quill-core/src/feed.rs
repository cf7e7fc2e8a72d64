//! Read-side projection of the published feed.

use chrono::{DateTime, Utc};

use crate::domain::Post;

/// Posts whose time has arrived, most recently due first.
///
/// Filters on `scheduled_time` rather than status, so posts a sweep has not
/// reached yet still show up. Ties keep their storage order.
pub fn project(posts: &[Post], now: DateTime<Utc>) -> Vec<Post> {
    let mut feed: Vec<Post> = posts
        .iter()
        .filter(|p| p.scheduled_time <= now)
        .cloned()
        .collect();

    feed.sort_by(|a, b| b.scheduled_time.cmp(&a.scheduled_time));
    feed
}
