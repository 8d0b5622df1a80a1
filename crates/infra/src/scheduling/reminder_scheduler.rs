//! Reminder scheduler for periodic scan-and-dispatch cycles.
//!
//! Runs one reminder cycle as soon as it starts and then one per interval
//! until stopped. The scheduler owns its cancellation token and task handle,
//! so several independent schedulers can coexist (tests do this).
//!
//! Manual checks go through the same [`ReminderEngine`], whose cycle lock
//! keeps timer-driven and manual cycles from overlapping.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use calnotify_infra::scheduling::{ReminderScheduler, ReminderSchedulerConfig};
//!
//! # async fn example(engine: Arc<calnotify_core::ReminderEngine>) -> Result<(), Box<dyn std::error::Error>> {
//! let scheduler = ReminderScheduler::new(
//!     engine,
//!     ReminderSchedulerConfig { interval: Duration::from_secs(300), ..Default::default() },
//! );
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use std::time::Duration;

use calnotify_core::{CycleSummary, ReminderEngine, ReminderError};
use calnotify_domain::constants::DEFAULT_SCAN_INTERVAL_SECS;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Configuration for the reminder scheduler
#[derive(Debug, Clone)]
pub struct ReminderSchedulerConfig {
    /// Pause between the end of one cycle and the start of the next
    pub interval: Duration,
    /// How long `stop` waits for an in-progress cycle
    pub join_timeout: Duration,
}

impl Default for ReminderSchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_SCAN_INTERVAL_SECS),
            join_timeout: Duration::from_secs(30),
        }
    }
}

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    Stopped,
    Running,
}

/// Point-in-time view of the scheduler
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub state: SchedulerState,
    pub running: bool,
    pub interval_seconds: u64,
    pub cycles_completed: u64,
    pub cycles_failed: u64,
    pub last_cycle: Option<CycleSummary>,
    pub last_error: Option<String>,
}

/// Outcome bookkeeping shared with the background task
#[derive(Default)]
struct CycleStats {
    completed: AtomicU64,
    failed: AtomicU64,
    last_cycle: StdMutex<Option<CycleSummary>>,
    last_error: StdMutex<Option<String>>,
}

impl CycleStats {
    fn record(&self, result: &Result<CycleSummary, ReminderError>) {
        match result {
            Ok(summary) => {
                self.completed.fetch_add(1, Ordering::Relaxed);
                *lock(&self.last_cycle) = Some(summary.clone());
                *lock(&self.last_error) = None;
            }
            Err(err) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                *lock(&self.last_error) = Some(err.to_string());
            }
        }
    }
}

/// Interval-driven reminder scheduler
pub struct ReminderScheduler {
    engine: Arc<ReminderEngine>,
    config: ReminderSchedulerConfig,
    cancellation_token: StdMutex<CancellationToken>,
    task_handle: TaskHandle,
    stats: Arc<CycleStats>,
}

impl ReminderScheduler {
    pub fn new(engine: Arc<ReminderEngine>, config: ReminderSchedulerConfig) -> Self {
        Self {
            engine,
            config,
            cancellation_token: StdMutex::new(CancellationToken::new()),
            task_handle: Arc::new(Mutex::new(None)),
            stats: Arc::new(CycleStats::default()),
        }
    }

    /// Start the scheduler
    ///
    /// Spawns the background loop; the first cycle runs immediately.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyRunning` if the loop is active
    #[instrument(skip(self))]
    pub async fn start(&self) -> SchedulerResult<()> {
        let mut handle_slot = self.task_handle.lock().await;
        if handle_slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!(interval_secs = self.config.interval.as_secs(), "Starting reminder scheduler");

        // Fresh token so the scheduler can be restarted after stop
        let cancel = CancellationToken::new();
        *lock(&self.cancellation_token) = cancel.clone();

        let engine = Arc::clone(&self.engine);
        let stats = Arc::clone(&self.stats);
        let interval = self.config.interval;

        *handle_slot = Some(tokio::spawn(async move {
            Self::reminder_loop(engine, stats, interval, cancel).await;
        }));

        info!("Reminder scheduler started");
        Ok(())
    }

    /// Stop the scheduler
    ///
    /// Cancels the interval wait and waits up to `join_timeout` for a cycle
    /// in progress. A cycle that outlives the timeout is detached and keeps
    /// running to completion; the scheduler counts as stopped either way.
    ///
    /// # Errors
    ///
    /// `NotRunning` if the loop is not active, `Timeout` if the in-progress
    /// cycle was detached.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> SchedulerResult<()> {
        let handle = {
            let mut handle_slot = self.task_handle.lock().await;
            match handle_slot.take() {
                Some(handle) if !handle.is_finished() => handle,
                _ => return Err(SchedulerError::NotRunning),
            }
        };

        info!("Stopping reminder scheduler");
        lock(&self.cancellation_token).cancel();

        let join_timeout = self.config.join_timeout;
        match tokio::time::timeout(join_timeout, handle).await {
            Ok(Ok(())) => {
                info!("Reminder scheduler stopped");
                Ok(())
            }
            Ok(Err(join_err)) => Err(SchedulerError::TaskJoinFailed(join_err.to_string())),
            Err(_) => {
                warn!(
                    timeout_secs = join_timeout.as_secs(),
                    "Reminder cycle still running at shutdown; detaching"
                );
                Err(SchedulerError::Timeout { seconds: join_timeout.as_secs() })
            }
        }
    }

    /// Check if scheduler is running
    ///
    /// A scheduler is considered running if it has an active task handle that
    /// hasn't finished.
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    pub fn state(&self) -> SchedulerState {
        if self.is_running() {
            SchedulerState::Running
        } else {
            SchedulerState::Stopped
        }
    }

    /// Run one cycle now and wait for it.
    ///
    /// Works whether or not the loop is running.
    pub async fn check_now(&self) -> SchedulerResult<CycleSummary> {
        let result = self.engine.run_cycle().await;
        self.stats.record(&result);
        Ok(result?)
    }

    /// Spawn one cycle and return immediately.
    pub fn trigger(&self) -> JoinHandle<()> {
        let engine = Arc::clone(&self.engine);
        let stats = Arc::clone(&self.stats);
        debug!("Manual reminder cycle triggered");
        tokio::spawn(async move {
            let result = engine.run_cycle().await;
            stats.record(&result);
        })
    }

    pub fn status(&self) -> SchedulerStatus {
        let state = self.state();
        SchedulerStatus {
            state,
            running: state == SchedulerState::Running,
            interval_seconds: self.config.interval.as_secs(),
            cycles_completed: self.stats.completed.load(Ordering::Relaxed),
            cycles_failed: self.stats.failed.load(Ordering::Relaxed),
            last_cycle: lock(&self.stats.last_cycle).clone(),
            last_error: lock(&self.stats.last_error).clone(),
        }
    }

    pub fn engine(&self) -> &Arc<ReminderEngine> {
        &self.engine
    }

    /// Background loop. Cycle errors are already logged by the engine.
    async fn reminder_loop(
        engine: Arc<ReminderEngine>,
        stats: Arc<CycleStats>,
        interval: Duration,
        cancel: CancellationToken,
    ) {
        loop {
            let result = engine.run_cycle().await;
            stats.record(&result);

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Reminder loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }
}

fn lock<T>(mutex: &StdMutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Ensure the loop is cancelled when the scheduler is dropped
impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        let token = lock(&self.cancellation_token);
        if !token.is_cancelled() && self.is_running() {
            warn!("ReminderScheduler dropped while running; cancelling");
        }
        token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use calnotify_core::{
        ChannelError, DeliveryReceipt, EmailMessage, EmailSender, EventStore, FixedClock,
        Mailbox, MessagingSender, NotificationDispatcher, ReminderScanner, TextMessage,
    };
    use calnotify_domain::{CalNotifyError, DateRange, Event};
    use chrono::NaiveDate;

    use super::*;

    struct CountingStore {
        queries: AtomicUsize,
        delay: Duration,
        fail: bool,
    }

    impl CountingStore {
        fn new() -> Arc<Self> {
            Arc::new(Self { queries: AtomicUsize::new(0), delay: Duration::ZERO, fail: false })
        }
    }

    #[async_trait]
    impl EventStore for CountingStore {
        async fn get_events_by_date_range(
            &self,
            _range: DateRange,
        ) -> calnotify_domain::Result<Vec<Event>> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                return Err(CalNotifyError::Database("database is locked".into()));
            }
            Ok(Vec::new())
        }
    }

    struct Disabled;

    #[async_trait]
    impl EmailSender for Disabled {
        fn is_configured(&self) -> bool {
            false
        }

        fn sender(&self) -> Option<Mailbox> {
            None
        }

        async fn send(&self, _message: &EmailMessage) -> Result<DeliveryReceipt, ChannelError> {
            Err(ChannelError::Unconfigured)
        }
    }

    #[async_trait]
    impl MessagingSender for Disabled {
        fn is_configured(&self) -> bool {
            false
        }

        fn sender(&self) -> Option<String> {
            None
        }

        async fn send(&self, _message: &TextMessage) -> Result<DeliveryReceipt, ChannelError> {
            Err(ChannelError::Unconfigured)
        }
    }

    fn scheduler_with(store: Arc<CountingStore>, interval: Duration) -> ReminderScheduler {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let dispatcher = Arc::new(NotificationDispatcher::new(Arc::new(Disabled), Arc::new(Disabled)));
        let engine = ReminderEngine::new(
            ReminderScanner::new(store),
            dispatcher,
            Arc::new(FixedClock::new(today)),
        );
        ReminderScheduler::new(
            Arc::new(engine),
            ReminderSchedulerConfig { interval, join_timeout: Duration::from_secs(2) },
        )
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_scheduler_lifecycle() {
        let scheduler = scheduler_with(CountingStore::new(), Duration::from_secs(60));

        // Initially not running
        assert!(!scheduler.is_running());

        // Start succeeds
        scheduler.start().await.unwrap();
        assert!(scheduler.is_running());
        assert_eq!(scheduler.state(), SchedulerState::Running);

        // Stop succeeds
        scheduler.stop().await.unwrap();
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.status().state, SchedulerState::Stopped);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_double_start_fails() {
        let scheduler = scheduler_with(CountingStore::new(), Duration::from_secs(60));

        scheduler.start().await.unwrap();

        let result = scheduler.start().await;
        assert!(matches!(result, Err(SchedulerError::AlreadyRunning)));

        scheduler.stop().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_stop_when_stopped_fails() {
        let scheduler = scheduler_with(CountingStore::new(), Duration::from_secs(60));
        assert!(matches!(scheduler.stop().await, Err(SchedulerError::NotRunning)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_first_cycle_runs_immediately_and_repeats() {
        let store = CountingStore::new();
        let scheduler = scheduler_with(Arc::clone(&store), Duration::from_millis(20));

        scheduler.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        scheduler.stop().await.unwrap();

        // Each cycle queries today and tomorrow
        let queries = store.queries.load(Ordering::SeqCst);
        assert!(queries >= 4, "expected at least two cycles, saw {queries} queries");
        assert!(scheduler.status().cycles_completed >= 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_restart_after_stop() {
        let scheduler = scheduler_with(CountingStore::new(), Duration::from_secs(60));

        scheduler.start().await.unwrap();
        scheduler.stop().await.unwrap();
        scheduler.start().await.unwrap();
        assert!(scheduler.is_running());
        scheduler.stop().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_check_now_works_while_stopped() {
        let store = CountingStore::new();
        let scheduler = scheduler_with(Arc::clone(&store), Duration::from_secs(60));

        let summary = scheduler.check_now().await.unwrap();

        assert_eq!(summary.reminders_due, 0);
        assert_eq!(store.queries.load(Ordering::SeqCst), 2);
        let status = scheduler.status();
        assert!(!status.running);
        assert_eq!(status.cycles_completed, 1);
        assert!(status.last_cycle.is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failed_check_is_reported_and_counted() {
        let store = Arc::new(CountingStore {
            queries: AtomicUsize::new(0),
            delay: Duration::ZERO,
            fail: true,
        });
        let scheduler = scheduler_with(store, Duration::from_secs(60));

        let err = scheduler.check_now().await.unwrap_err();

        assert!(matches!(err, SchedulerError::Cycle(ReminderError::StoreQueryFailure { .. })));
        let status = scheduler.status();
        assert_eq!(status.cycles_failed, 1);
        assert!(status.last_error.unwrap_or_default().contains("database is locked"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_trigger_returns_before_cycle_finishes() {
        let store = Arc::new(CountingStore {
            queries: AtomicUsize::new(0),
            delay: Duration::from_millis(100),
            fail: false,
        });
        let scheduler = scheduler_with(store, Duration::from_secs(60));

        let handle = scheduler.trigger();
        assert_eq!(scheduler.status().cycles_completed, 0);

        handle.await.unwrap();
        assert_eq!(scheduler.status().cycles_completed, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_stop_detaches_slow_cycle() {
        let store = Arc::new(CountingStore {
            queries: AtomicUsize::new(0),
            delay: Duration::from_millis(500),
            fail: false,
        });
        let engine = ReminderEngine::new(
            ReminderScanner::new(store),
            Arc::new(NotificationDispatcher::new(Arc::new(Disabled), Arc::new(Disabled))),
            Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())),
        );
        let scheduler = ReminderScheduler::new(
            Arc::new(engine),
            ReminderSchedulerConfig {
                interval: Duration::from_secs(60),
                join_timeout: Duration::from_millis(50),
            },
        );

        scheduler.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let result = scheduler.stop().await;
        assert!(matches!(result, Err(SchedulerError::Timeout { .. })));
        assert!(!scheduler.is_running());
    }
}
