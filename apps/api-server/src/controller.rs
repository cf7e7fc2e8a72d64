//! Application controller - turns submissions into stored, scheduled posts.
//!
//! Order within one submission: validate, mutate the store, persist, then
//! (re)start the promotion scheduler.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::FixedOffset;
use tokio::sync::{Mutex, watch};

use quill_core::feed::project;
use quill_core::ports::{Clock, KeyValueStore, Notifier};
use quill_core::validation::validate;
use quill_core::{DomainError, Draft, Post, PostStatus, PostStore, Posts, SubmitError};
use quill_infra::{PersistenceGateway, PromotionScheduler, SharedStore};

use crate::config::PipelineConfig;

pub const SUCCESS_MESSAGE: &str = "Post scheduled successfully!";
pub const FAILURE_MESSAGE: &str = "Failed to schedule post. Please try again.";

pub struct Controller {
    store: SharedStore,
    gateway: Arc<PersistenceGateway>,
    scheduler: Mutex<PromotionScheduler>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    zone: FixedOffset,
    in_flight: AtomicUsize,
    updates: Arc<watch::Sender<Posts>>,
}

/// Counts one submission in flight until dropped, however the submission ends.
struct Submitting<'a>(&'a AtomicUsize);

impl<'a> Submitting<'a> {
    fn enter(count: &'a AtomicUsize) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self(count)
    }
}

impl Drop for Submitting<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Controller {
    /// Load persisted posts and wire the store, gateway and scheduler.
    ///
    /// The scheduler is left stopped; call [`Controller::resume`] to start it.
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        config: &PipelineConfig,
    ) -> Self {
        let gateway = Arc::new(PersistenceGateway::new(storage, config.storage_key.clone()));
        let posts = gateway.load();
        tracing::info!(count = posts.len(), "Posts restored");

        let store = PostStore::new(posts, config.zone);
        let updates = Arc::new(watch::channel(store.snapshot()).0);
        let store = Arc::new(Mutex::new(store));

        let sender = Arc::clone(&updates);
        let scheduler = PromotionScheduler::new(
            Arc::clone(&store),
            Arc::clone(&gateway),
            Arc::clone(&clock),
            config.scheduler.clone(),
        )
        .on_change(move |posts| {
            sender.send_replace(posts);
        });

        Self {
            store,
            gateway,
            scheduler: Mutex::new(scheduler),
            clock,
            notifier,
            zone: config.zone,
            in_flight: AtomicUsize::new(0),
            updates,
        }
    }

    /// Start promoting restored posts. Overdue ones are published at once.
    pub async fn resume(&self) {
        self.scheduler.lock().await.start().await;
    }

    /// Validate and store a draft, then notify the user of the outcome.
    ///
    /// Validation failures come back as field errors without touching the
    /// store or emitting a notification.
    pub async fn submit(&self, draft: Draft) -> Result<Post, SubmitError> {
        let _submitting = Submitting::enter(&self.in_flight);

        let now = self.clock.now();
        let normalized = validate(&draft, now, &self.zone).map_err(|errors| {
            tracing::debug!(%errors, "Draft rejected");
            SubmitError::Invalid(errors)
        })?;

        self.commit(|store| store.create(normalized, now)).await
    }

    async fn commit<F>(&self, mutate: F) -> Result<Post, SubmitError>
    where
        F: FnOnce(&mut PostStore) -> Result<Posts, DomainError>,
    {
        match self.apply(mutate).await {
            Ok(post) => {
                tracing::info!(
                    post_id = %post.id,
                    status = ?post.status,
                    scheduled_time = %post.scheduled_time,
                    "Post created"
                );
                self.notifier.success(SUCCESS_MESSAGE).await;
                Ok(post)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to submit post");
                self.notifier.failure(FAILURE_MESSAGE).await;
                Err(e.into())
            }
        }
    }

    async fn apply<F>(&self, mutate: F) -> Result<Post, DomainError>
    where
        F: FnOnce(&mut PostStore) -> Result<Posts, DomainError>,
    {
        // Published under the store lock: subscribers see snapshots in store order.
        let post = {
            let mut store = self.store.lock().await;
            let posts = mutate(&mut store)?;
            self.gateway.save(&posts);
            let post = posts
                .first()
                .cloned()
                .ok_or_else(|| DomainError::Internal("store empty after insert".to_string()))?;
            self.updates.send_replace(posts);
            post
        };

        if post.status == PostStatus::Scheduled {
            self.scheduler.lock().await.start().await;
        }

        Ok(post)
    }

    /// Published posts, most recently due first.
    pub async fn feed(&self) -> Vec<Post> {
        let posts = self.posts().await;
        project(&posts, self.clock.now())
    }

    /// Every post in storage order.
    pub async fn posts(&self) -> Posts {
        self.store.lock().await.snapshot()
    }

    /// Follow the post collection as submissions and sweeps change it.
    pub fn subscribe(&self) -> watch::Receiver<Posts> {
        self.updates.subscribe()
    }

    /// True while at least one submission is being processed.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn is_scheduler_running(&self) -> bool {
        self.scheduler.lock().await.is_running()
    }

    /// Stop the promotion scheduler.
    pub async fn shutdown(&self) {
        self.scheduler.lock().await.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use quill_core::error::{Field, ValidationError};
    use quill_infra::{AnchoredClock, ChannelNotifier, InMemoryKeyValueStore, Notification};
    use tokio::sync::broadcast::error::TryRecvError;
    use tokio::sync::{Notify, oneshot};

    struct Harness {
        kv: Arc<InMemoryKeyValueStore>,
        clock: Arc<AnchoredClock>,
        notifier: Arc<ChannelNotifier>,
        controller: Controller,
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            zone: FixedOffset::east_opt(0).unwrap(),
            ..PipelineConfig::default()
        }
    }

    fn harness_with(kv: Arc<InMemoryKeyValueStore>, clock: Arc<AnchoredClock>) -> Harness {
        let notifier = Arc::new(ChannelNotifier::default());
        let controller = Controller::new(kv.clone(), clock.clone(), notifier.clone(), &config());
        Harness {
            kv,
            clock,
            notifier,
            controller,
        }
    }

    fn harness() -> Harness {
        harness_with(
            Arc::new(InMemoryKeyValueStore::new()),
            Arc::new(AnchoredClock::new()),
        )
    }

    /// Parks the first success signal until released.
    struct HoldingNotifier {
        entered: Notify,
        release: Mutex<Option<oneshot::Receiver<()>>>,
    }

    #[async_trait::async_trait]
    impl Notifier for HoldingNotifier {
        async fn success(&self, _message: &str) {
            let held = self.release.lock().await.take();
            if let Some(held) = held {
                self.entered.notify_one();
                let _ = held.await;
            }
        }

        async fn failure(&self, _message: &str) {}
    }

    fn at(now: DateTime<Utc>, secs: i64) -> String {
        (now + Duration::seconds(secs)).to_rfc3339()
    }

    #[tokio::test(start_paused = true)]
    async fn test_future_submission_is_scheduled() {
        let h = harness();
        let mut signals = h.notifier.subscribe();
        let now = h.clock.now();

        let post = h
            .controller
            .submit(Draft::new("Hello world", at(now, 60)))
            .await
            .unwrap();

        assert_eq!(post.status, PostStatus::Scheduled);
        assert_eq!(post.content, "Hello world");
        assert_eq!(h.controller.posts().await.len(), 1);
        assert!(h.controller.feed().await.is_empty());
        assert_eq!(h.kv.writes(), 1);
        assert!(h.controller.is_scheduler_running().await);
        assert!(!h.controller.is_submitting());
        assert_eq!(
            signals.try_recv().unwrap(),
            Notification::Success(SUCCESS_MESSAGE.to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_due_post_is_published_at_creation() {
        let h = harness();
        let now = h.clock.now();
        let draft = quill_core::NormalizedDraft {
            content: "Already due".to_string(),
            scheduled_time: now - Duration::seconds(60),
        };

        let post = h
            .controller
            .commit(|store| store.create(draft, now))
            .await
            .unwrap();

        assert_eq!(post.status, PostStatus::Published);
        let feed = h.controller.feed().await;
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].content, "Already due");
        assert!(!h.controller.is_scheduler_running().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_past_submission_is_rejected() {
        let h = harness();
        let now = h.clock.now();

        let err = h
            .controller
            .submit(Draft::new("Already due", at(now, -60)))
            .await
            .unwrap_err();

        let SubmitError::Invalid(errors) = err else {
            panic!("expected field errors");
        };
        assert_eq!(
            errors.get(Field::ScheduledTime),
            Some(&ValidationError::NotInFuture)
        );
        assert!(h.controller.posts().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_post_is_promoted_by_ticks() {
        let h = harness();
        let mut updates = h.controller.subscribe();
        let now = h.clock.now();

        h.controller
            .submit(Draft::new("Soon", at(now, 1)))
            .await
            .unwrap();
        updates.mark_unchanged();
        assert_eq!(h.kv.writes(), 1);

        tokio::time::sleep(std::time::Duration::from_secs(2)).await;

        assert_eq!(h.kv.writes(), 2);
        assert!(updates.has_changed().unwrap());
        assert!(updates.borrow_and_update()[0].is_published());

        let feed = h.controller.feed().await;
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].content, "Soon");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_content_creates_nothing() {
        let h = harness();
        let mut signals = h.notifier.subscribe();
        let now = h.clock.now();

        let err = h
            .controller
            .submit(Draft::new("", at(now, 60)))
            .await
            .unwrap_err();

        let SubmitError::Invalid(errors) = err else {
            panic!("expected field errors");
        };
        assert_eq!(
            errors.messages().get("content").map(String::as_str),
            Some("Description is required")
        );
        assert!(h.controller.posts().await.is_empty());
        assert_eq!(h.kv.writes(), 0);
        assert!(matches!(signals.try_recv(), Err(TryRecvError::Empty)));
        assert!(!h.controller.is_scheduler_running().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unexpected_failure_adds_nothing() {
        let h = harness();
        let now = h.clock.now();
        let post = h
            .controller
            .submit(Draft::new("Original", at(now, 60)))
            .await
            .unwrap();
        let mut signals = h.notifier.subscribe();
        let before = h.controller.posts().await;

        let err = h
            .controller
            .commit(|store| store.insert(post.clone()))
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::Failed(DomainError::Duplicate(id)) if id == post.id));
        assert!(Arc::ptr_eq(&before, &h.controller.posts().await));
        assert_eq!(h.kv.writes(), 1);
        assert_eq!(
            signals.try_recv().unwrap(),
            Notification::Failure(FAILURE_MESSAGE.to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_publishes_overdue_restored_posts() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let clock = Arc::new(AnchoredClock::new());
        {
            let h = harness_with(kv.clone(), clock.clone());
            let now = h.clock.now();
            h.controller
                .submit(Draft::new("Restored", at(now, 1)))
                .await
                .unwrap();
            h.controller.shutdown().await;
        }

        tokio::time::advance(std::time::Duration::from_secs(5)).await;

        let h = harness_with(kv.clone(), clock);
        assert_eq!(h.controller.posts().await[0].status, PostStatus::Scheduled);

        h.controller.resume().await;
        assert!(h.controller.posts().await[0].is_published());
        assert_eq!(kv.writes(), 2);
        h.controller.shutdown().await;
        assert!(!h.controller.is_scheduler_running().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submitting_stays_set_while_any_submission_is_pending() {
        let (release, held) = oneshot::channel();
        let notifier = Arc::new(HoldingNotifier {
            entered: Notify::new(),
            release: Mutex::new(Some(held)),
        });
        let clock = Arc::new(AnchoredClock::new());
        let controller = Controller::new(
            Arc::new(InMemoryKeyValueStore::new()),
            clock.clone(),
            notifier.clone(),
            &config(),
        );
        let now = clock.now();

        let first = controller.submit(Draft::new("First", at(now, 60)));
        let second = {
            let controller = &controller;
            let notifier = &notifier;
            async move {
                notifier.entered.notified().await;
                controller
                    .submit(Draft::new("Second", at(now, 120)))
                    .await
                    .unwrap();
                let pending = controller.is_submitting();
                release.send(()).unwrap();
                pending
            }
        };

        let (first, still_submitting) = tokio::join!(first, second);
        first.unwrap();
        assert!(still_submitting);
        assert!(!controller.is_submitting());
        assert_eq!(controller.posts().await.len(), 2);
        controller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_hold_the_latest_stored_snapshot() {
        let h = harness();
        let updates = h.controller.subscribe();
        let now = h.clock.now();

        h.controller
            .submit(Draft::new("First", at(now, 60)))
            .await
            .unwrap();
        h.controller
            .submit(Draft::new("Second", at(now, 120)))
            .await
            .unwrap();

        let current = h.controller.posts().await;
        assert!(Arc::ptr_eq(&*updates.borrow(), &current));
        assert_eq!(current[0].content, "Second");
        h.controller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_with_nothing_stored_stays_idle() {
        let h = harness();
        h.controller.resume().await;
        assert!(!h.controller.is_scheduler_running().await);
        assert!(h.controller.feed().await.is_empty());
    }
}
