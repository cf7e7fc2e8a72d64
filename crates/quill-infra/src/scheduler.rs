//! Promotion scheduler - publishes scheduled posts once their time arrives.
//!
//! One sweep runs immediately on `start`, then one per interval on a spawned
//! tokio task. A sweep holds the store lock for its whole body and never
//! awaits inside it, so sweeps cannot overlap each other or a submission.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use quill_core::ports::Clock;
use quill_core::{PostStore, Posts, Sweep};

use crate::persistence::PersistenceGateway;

/// Store shared between the controller and the sweep task.
pub type SharedStore = Arc<Mutex<PostStore>>;

/// Callback fired with the new snapshot after a sweep changed something.
pub type PostsChanged = Arc<dyn Fn(Posts) + Send + Sync>;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Run the recurring sweep. When off only the sweep on `start` runs.
    pub enabled: bool,
    /// Time between sweeps.
    pub interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(1),
        }
    }
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var("SCHEDULER_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            interval: std::env::var("SCHEDULER_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(Duration::from_secs(1)),
        }
    }
}

/// Everything one sweep needs, shared with the spawned loop.
struct Sweeper {
    store: SharedStore,
    gateway: Arc<PersistenceGateway>,
    clock: Arc<dyn Clock>,
    on_change: PostsChanged,
}

impl Sweeper {
    fn run(&self, store: &mut PostStore) -> Sweep {
        let sweep = store.promote(self.clock.now());
        if sweep.changed {
            tracing::info!(
                promoted = sweep.promoted,
                total = sweep.posts.len(),
                "Scheduled posts published"
            );
            self.gateway.save(&sweep.posts);
            (self.on_change)(Arc::clone(&sweep.posts));
        }
        sweep
    }
}

enum State {
    Stopped,
    Running(JoinHandle<()>),
}

/// Recurring promotion sweep with an explicit `Stopped -> Running -> Stopped`
/// lifecycle. Dropping the scheduler stops it.
pub struct PromotionScheduler {
    sweeper: Arc<Sweeper>,
    config: SchedulerConfig,
    state: State,
}

impl PromotionScheduler {
    pub fn new(
        store: SharedStore,
        gateway: Arc<PersistenceGateway>,
        clock: Arc<dyn Clock>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            sweeper: Arc::new(Sweeper {
                store,
                gateway,
                clock,
                on_change: Arc::new(|_| {}),
            }),
            config,
            state: State::Stopped,
        }
    }

    /// Register the posts-changed callback.
    ///
    /// Must be called before the first `start`.
    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(Posts) + Send + Sync + 'static,
    {
        let sweeper = Sweeper {
            store: Arc::clone(&self.sweeper.store),
            gateway: Arc::clone(&self.sweeper.gateway),
            clock: Arc::clone(&self.sweeper.clock),
            on_change: Arc::new(callback),
        };
        self.sweeper = Arc::new(sweeper);
        self
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running(_))
    }

    /// (Re)start the scheduler.
    ///
    /// A running loop is stopped first. An empty store schedules nothing.
    pub async fn start(&mut self) {
        self.stop();

        {
            let mut store = self.sweeper.store.lock().await;
            if store.is_empty() {
                tracing::debug!("No posts to track, scheduler stays stopped");
                return;
            }
            self.sweeper.run(&mut store);
        }

        if !self.config.enabled {
            tracing::info!("Recurring promotion sweep disabled");
            return;
        }

        let sweeper = Arc::clone(&self.sweeper);
        let period = self.config.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let mut store = sweeper.store.lock().await;
                sweeper.run(&mut store);
            }
        });

        self.state = State::Running(handle);
        tracing::info!(interval_ms = period.as_millis() as u64, "Promotion scheduler started");
    }

    /// Stop the recurring sweep. No-op when already stopped.
    ///
    /// A sweep already holding the store lock finishes first.
    pub fn stop(&mut self) {
        if let State::Running(handle) = std::mem::replace(&mut self.state, State::Stopped) {
            handle.abort();
            tracing::info!("Promotion scheduler stopped");
        }
    }

    /// Run one sweep right now, outside the cadence.
    pub async fn sweep_now(&self) -> Sweep {
        let mut store = self.sweeper.store.lock().await;
        self.sweeper.run(&mut store)
    }
}

impl Drop for PromotionScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::AnchoredClock;
    use crate::persistence::DEFAULT_STORAGE_KEY;
    use crate::storage::InMemoryKeyValueStore;
    use chrono::{DateTime, FixedOffset, Utc};
    use quill_core::{NormalizedDraft, PostStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingClock {
        inner: AnchoredClock,
        calls: AtomicUsize,
    }

    impl Clock for CountingClock {
        fn now(&self) -> DateTime<Utc> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.now()
        }
    }

    struct Harness {
        store: SharedStore,
        kv: Arc<InMemoryKeyValueStore>,
        clock: Arc<CountingClock>,
        changes: Arc<AtomicUsize>,
        scheduler: PromotionScheduler,
    }

    impl Harness {
        fn new(config: SchedulerConfig) -> Self {
            let zone = FixedOffset::east_opt(0).unwrap();
            let store = Arc::new(Mutex::new(PostStore::new(Vec::new(), zone)));
            let kv = Arc::new(InMemoryKeyValueStore::new());
            let gateway = Arc::new(PersistenceGateway::new(kv.clone(), DEFAULT_STORAGE_KEY));
            let clock = Arc::new(CountingClock {
                inner: AnchoredClock::new(),
                calls: AtomicUsize::new(0),
            });
            let changes = Arc::new(AtomicUsize::new(0));

            let counter = changes.clone();
            let scheduler = PromotionScheduler::new(store.clone(), gateway, clock.clone(), config)
                .on_change(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                });

            Self {
                store,
                kv,
                clock,
                changes,
                scheduler,
            }
        }

        async fn add(&self, content: &str, offset_ms: i64) {
            let now = self.clock.inner.now();
            let draft = NormalizedDraft {
                content: content.to_string(),
                scheduled_time: now + chrono::Duration::milliseconds(offset_ms),
            };
            self.store.lock().await.create(draft, now).unwrap();
        }

        async fn status_of(&self, content: &str) -> PostStatus {
            let store = self.store.lock().await;
            store
                .snapshot()
                .iter()
                .find(|p| p.content == content)
                .map(|p| p.status)
                .unwrap()
        }

        fn clock_calls(&self) -> usize {
            self.clock.calls.load(Ordering::SeqCst)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_store_never_schedules() {
        let mut h = Harness::new(SchedulerConfig::default());
        h.scheduler.start().await;

        assert!(!h.scheduler.is_running());
        assert_eq!(h.clock_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_sweeps_immediately() {
        let mut h = Harness::new(SchedulerConfig::default());
        h.add("overdue", 1000).await;
        tokio::time::advance(Duration::from_secs(2)).await;

        h.scheduler.start().await;

        assert!(h.scheduler.is_running());
        assert_eq!(h.status_of("overdue").await, PostStatus::Published);
        assert_eq!(h.kv.writes(), 1);
        assert_eq!(h.changes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_due_post_is_published_by_tick() {
        let mut h = Harness::new(SchedulerConfig::default());
        h.add("soon", 1000).await;

        h.scheduler.start().await;
        assert_eq!(h.status_of("soon").await, PostStatus::Scheduled);
        assert_eq!(h.kv.writes(), 0);

        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(h.status_of("soon").await, PostStatus::Published);
        assert_eq!(h.kv.writes(), 1);
        assert_eq!(h.changes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_keeps_a_single_loop() {
        let mut h = Harness::new(SchedulerConfig::default());
        h.add("later", 60_000).await;

        h.scheduler.start().await;
        h.scheduler.start().await;
        assert!(h.scheduler.is_running());
        assert_eq!(h.clock_calls(), 2);

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(h.clock_calls(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_pending_sweeps() {
        let mut h = Harness::new(SchedulerConfig::default());
        h.scheduler.stop();

        h.add("soon", 1000).await;
        h.scheduler.start().await;
        h.scheduler.stop();
        h.scheduler.stop();
        assert!(!h.scheduler.is_running());

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(h.status_of("soon").await, PostStatus::Scheduled);
        assert_eq!(h.clock_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_the_loop() {
        let mut h = Harness::new(SchedulerConfig::default());
        h.add("later", 60_000).await;
        h.scheduler.start().await;

        let Harness {
            scheduler, clock, ..
        } = h;
        drop(scheduler);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(clock.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_runs_only_the_initial_sweep() {
        let config = SchedulerConfig {
            enabled: false,
            ..SchedulerConfig::default()
        };
        let mut h = Harness::new(config);
        h.add("soon", 1000).await;

        h.scheduler.start().await;
        assert!(!h.scheduler.is_running());

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(h.status_of("soon").await, PostStatus::Scheduled);

        let sweep = h.scheduler.sweep_now().await;
        assert!(sweep.changed);
        assert_eq!(h.status_of("soon").await, PostStatus::Published);
    }
}
