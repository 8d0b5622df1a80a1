//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use calnotify_core::{
    Clock, DispatcherSettings, EmailSender, EngineSettings, EventRepository, EventService,
    EventStore, MessagingSender, NotificationDispatcher, NotificationLedger, ReminderEngine,
    ReminderScanner, ZonedClock,
};
use calnotify_domain::{Config, Result};
use calnotify_infra::{
    DbManager, ReminderScheduler, ReminderSchedulerConfig, SchedulerError, SendGridEmailSender,
    SqliteEventRepository, SqliteNotificationLedger, TwilioMessagingSender,
};
use tracing::{info, warn};

/// Which delivery channels have credentials
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ChannelAvailability {
    pub email: bool,
    pub messaging: bool,
}

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub clock: Arc<dyn Clock>,
    pub events: Arc<EventService>,
    pub engine: Arc<ReminderEngine>,
    pub scheduler: Arc<ReminderScheduler>,
    pub channels: ChannelAvailability,
}

impl AppContext {
    /// Build every component from `config`.
    ///
    /// Opens the database and applies migrations. The scheduler is created
    /// stopped; see [`AppContext::start_scheduler`].
    ///
    /// # Errors
    /// Database, time zone or HTTP client construction failures.
    pub fn new(config: Config) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(ZonedClock::from_name(&config.scheduler.timezone)?);

        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;

        let sqlite_events = Arc::new(SqliteEventRepository::new(Arc::clone(&db)));
        let repository: Arc<dyn EventRepository> = sqlite_events.clone();
        let store: Arc<dyn EventStore> = sqlite_events;

        let events = Arc::new(EventService::new(repository, Arc::clone(&store), Arc::clone(&clock)));

        let send_timeout = Duration::from_secs(config.scheduler.send_timeout_seconds.max(1));
        let email: Arc<dyn EmailSender> =
            Arc::new(SendGridEmailSender::from_config(&config.email, send_timeout)?);
        let messaging: Arc<dyn MessagingSender> =
            Arc::new(TwilioMessagingSender::from_config(&config.messaging, send_timeout)?);
        let channels =
            ChannelAvailability { email: email.is_configured(), messaging: messaging.is_configured() };
        if !channels.email {
            warn!("Email channel not configured; email reminders will be skipped");
        }
        if !channels.messaging {
            warn!("Messaging channel not configured; text reminders will be skipped");
        }

        let dispatcher = Arc::new(
            NotificationDispatcher::new(email, messaging)
                .with_settings(DispatcherSettings { send_timeout }),
        );

        let mut engine = ReminderEngine::new(ReminderScanner::new(store), dispatcher, Arc::clone(&clock))
            .with_settings(EngineSettings {
                cycle_timeout: Duration::from_secs(config.scheduler.cycle_timeout_seconds.max(1)),
            });
        if config.scheduler.dedupe {
            let ledger: Arc<dyn NotificationLedger> =
                Arc::new(SqliteNotificationLedger::new(Arc::clone(&db)));
            engine = engine.with_ledger(ledger);
        }
        let engine = Arc::new(engine);

        let scheduler = Arc::new(ReminderScheduler::new(
            Arc::clone(&engine),
            ReminderSchedulerConfig {
                interval: Duration::from_secs(config.scheduler.interval_seconds.max(1)),
                ..ReminderSchedulerConfig::default()
            },
        ));

        info!(
            db_path = %config.database.path,
            timezone = %config.scheduler.timezone,
            dedupe = config.scheduler.dedupe,
            "Application context initialised"
        );

        Ok(Self { config, db, clock, events, engine, scheduler, channels })
    }

    /// Start the reminder loop when enabled in configuration.
    ///
    /// # Errors
    /// `AlreadyRunning` when called twice.
    pub async fn start_scheduler(&self) -> std::result::Result<bool, SchedulerError> {
        if !self.config.scheduler.enabled {
            info!("Reminder scheduler disabled by configuration");
            return Ok(false);
        }
        self.scheduler.start().await?;
        Ok(true)
    }

    /// Stop background work. A stopped scheduler is not an error here.
    pub async fn shutdown(&self) {
        info!("shutdown called on AppContext");
        match self.scheduler.stop().await {
            Ok(()) | Err(SchedulerError::NotRunning) => {}
            Err(err) => warn!(error = %err, "Reminder scheduler did not stop cleanly"),
        }
    }
}
