//! Business logic services for subscriptions, fixture lookups and reminders.

use std::sync::Arc;

use crate::config::Config;
use crate::message::MessageFormatter;
use crate::notifier::Notifier;
use crate::reminder::ReminderWindows;
use crate::service::fixture_service::FixtureService;
use crate::service::reminder_service::ReminderService;
use crate::service::subscription_service::SubscriptionService;
use crate::source::FixtureSource;
use crate::store::NotificationLog;
use crate::store::SubscriberStore;
use crate::store::notification_log::SENT_FILE;
use crate::store::subscriber_store::USERS_FILE;

pub mod error;
pub mod fixture_service;
pub mod reminder_service;
pub mod subscription_service;

/// Container for all application services.
pub struct Services {
    pub subscription: Arc<SubscriptionService>,
    pub fixtures: Arc<FixtureService>,
    pub reminder: Arc<ReminderService>,
    pub formatter: Arc<MessageFormatter>,
}

impl Services {
    /// Creates all services over the stores under `config.data_path`.
    pub fn new(
        config: &Config,
        source: Arc<dyn FixtureSource>,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        let formatter = Arc::new(MessageFormatter::new(
            config.timezone,
            config.timezone_label.clone(),
            config.team_name.clone(),
        )?);
        let subscribers = Arc::new(SubscriberStore::new(config.data_path.join(USERS_FILE)));
        let log = Arc::new(NotificationLog::new(config.data_path.join(SENT_FILE)));

        let reminder = Arc::new(ReminderService::new(
            source.clone(),
            subscribers.clone(),
            log,
            notifier,
            formatter.clone(),
            ReminderWindows::new(config.result_window),
        ));

        Ok(Self {
            subscription: Arc::new(SubscriptionService::new(subscribers)),
            fixtures: Arc::new(FixtureService::new(source)),
            reminder,
            formatter,
        })
    }
}
