//! Authoritative in-memory post collection for a session.
//!
//! The store hands out shared snapshots. Mutations never touch a snapshot that
//! was already handed out: they build a new one and swap it in, so holders can
//! detect change by pointer identity as well as through [`Sweep::changed`].

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use crate::domain::{NormalizedDraft, Post, PostId};
use crate::error::DomainError;

/// Immutable view of the collection, newest insertion first.
pub type Posts = Arc<Vec<Post>>;

/// Result of one promotion pass.
#[derive(Debug, Clone)]
pub struct Sweep {
    pub posts: Posts,
    pub changed: bool,
    pub promoted: usize,
}

#[derive(Debug)]
pub struct PostStore {
    posts: Posts,
    zone: FixedOffset,
}

impl PostStore {
    /// Build a store over previously persisted posts.
    ///
    /// Posts repeating an earlier id are dropped so ids stay unique.
    pub fn new(posts: Vec<Post>, zone: FixedOffset) -> Self {
        let mut seen = HashSet::with_capacity(posts.len());
        let posts: Vec<Post> = posts
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect();

        Self {
            posts: Arc::new(posts),
            zone,
        }
    }

    pub fn snapshot(&self) -> Posts {
        Arc::clone(&self.posts)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn get(&self, id: &PostId) -> Option<&Post> {
        self.posts.iter().find(|p| &p.id == id)
    }

    /// Create a post from `draft` and prepend it.
    pub fn create(
        &mut self,
        draft: NormalizedDraft,
        now: DateTime<Utc>,
    ) -> Result<Posts, DomainError> {
        let post = Post::new(draft, now, &self.zone);
        self.insert(post)
    }

    /// Prepend an already built post.
    pub fn insert(&mut self, post: Post) -> Result<Posts, DomainError> {
        if self.get(&post.id).is_some() {
            return Err(DomainError::Duplicate(post.id));
        }

        let mut posts = Vec::with_capacity(self.posts.len() + 1);
        posts.push(post);
        posts.extend(self.posts.iter().cloned());

        self.posts = Arc::new(posts);
        Ok(self.snapshot())
    }

    /// Publish every scheduled post whose time is at or before `now`.
    ///
    /// When nothing is due the returned snapshot is the current allocation.
    pub fn promote(&mut self, now: DateTime<Utc>) -> Sweep {
        let promoted = self.posts.iter().filter(|p| p.is_due(now)).count();
        if promoted == 0 {
            return Sweep {
                posts: self.snapshot(),
                changed: false,
                promoted,
            };
        }

        let posts = self
            .posts
            .iter()
            .map(|p| {
                if p.is_due(now) {
                    p.published()
                } else {
                    p.clone()
                }
            })
            .collect();

        self.posts = Arc::new(posts);
        Sweep {
            posts: self.snapshot(),
            changed: true,
            promoted,
        }
    }
}
