//! Application context - dependency injection container

use std::sync::Arc;

use chrono::Duration;
use slotwise_core::booking::ports::BookingStore;
use slotwise_core::dispatch::ports::{CalendarMirror, NotificationSender, ReminderStore};
use slotwise_core::{
    AvailabilityService, BookingService, CatalogRepository, ExternalBusyFeed,
    SideEffectDispatcher,
};
use slotwise_domain::{Config, Result};
use slotwise_infra::scheduling::{
    MirrorScheduler, MirrorSchedulerConfig, ReminderScheduler, ReminderSchedulerConfig,
};
use slotwise_infra::{
    CalendarSyncService, DbManager, GoogleAuthFlow, GoogleCalendarApi, GoogleTokenProvider,
    SqliteBookingStore, SqliteCatalogRepository, SqliteReminderStore, SqliteTokenRepository,
    WebhookNotifier,
};
use tracing::info;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub catalog: Arc<SqliteCatalogRepository>,
    pub bookings: Arc<dyn BookingStore>,
    pub reminders: Arc<dyn ReminderStore>,
    pub tokens: Arc<SqliteTokenRepository>,
    pub auth_flow: Arc<GoogleAuthFlow>,
    pub availability: Arc<AvailabilityService>,
    pub booking_service: Arc<BookingService>,
    pub dispatcher: Arc<SideEffectDispatcher>,
}

impl AppContext {
    /// Wire up the full dependency graph from configuration.
    pub fn new(config: Config) -> Result<Self> {
        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;

        let catalog = Arc::new(SqliteCatalogRepository::new(Arc::clone(&db)));
        let catalog_port: Arc<dyn CatalogRepository> = catalog.clone();

        let bookings: Arc<dyn BookingStore> =
            Arc::new(SqliteBookingStore::new(Arc::clone(&db)));
        let reminders: Arc<dyn ReminderStore> =
            Arc::new(SqliteReminderStore::new(Arc::clone(&db)));
        let tokens = Arc::new(SqliteTokenRepository::new(Arc::clone(&db)));

        let auth_flow = Arc::new(GoogleAuthFlow::new(
            config.calendar.client_id.clone().unwrap_or_default(),
            config.calendar.client_secret.clone(),
            config.calendar.redirect_uri.clone(),
        ));

        let token_provider =
            Arc::new(GoogleTokenProvider::new(Arc::clone(&tokens), Arc::clone(&auth_flow)));
        let sync = Arc::new(
            CalendarSyncService::new(Arc::new(GoogleCalendarApi::new()), token_provider)
                .with_push_max_attempts(config.calendar.push_max_attempts),
        );
        let busy_feed: Arc<dyn ExternalBusyFeed> = sync.clone();
        let mirror: Arc<dyn CalendarMirror> = sync;

        let notifier: Arc<dyn NotificationSender> =
            Arc::new(WebhookNotifier::new(config.calendar.notifier_endpoint.clone()));

        let dispatcher = Arc::new(
            SideEffectDispatcher::new(
                catalog_port.clone(),
                bookings.clone(),
                reminders.clone(),
                mirror,
                notifier,
            )
            .with_reminder_lead(Duration::minutes(config.scheduling.reminder_lead_minutes))
            .with_reminder_batch(config.scheduling.reminder_batch_size),
        );

        let availability = Arc::new(
            AvailabilityService::new(catalog_port.clone(), bookings.clone(), busy_feed.clone())
                .with_max_range_days(config.scheduling.max_range_days),
        );

        let booking_service = Arc::new(BookingService::new(
            catalog_port,
            bookings.clone(),
            busy_feed,
            Arc::clone(&dispatcher),
        ));

        info!(db_path = %config.database.path, "application context initialised");

        Ok(Self {
            config,
            db,
            catalog,
            bookings,
            reminders,
            tokens,
            auth_flow,
            availability,
            booking_service,
            dispatcher,
        })
    }

    /// Build the background triggers from configuration. The caller owns
    /// starting and stopping them.
    pub fn build_schedulers(&self) -> (ReminderScheduler, MirrorScheduler) {
        let reminder = ReminderScheduler::with_config(
            ReminderSchedulerConfig {
                cron_expression: self.config.scheduling.reminder_cron.clone(),
                ..Default::default()
            },
            Arc::clone(&self.dispatcher),
        );

        let mirror = MirrorScheduler::with_config(
            MirrorSchedulerConfig {
                cron_expression: self.config.scheduling.mirror_cron.clone(),
                ..Default::default()
            },
            self.bookings.clone(),
            Arc::clone(&self.dispatcher),
        );

        (reminder, mirror)
    }
}
