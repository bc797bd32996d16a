//! The reminder engine: one pass fetches fixtures, finds due reminders and
//! delivers each one to every subscriber at most once.

use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use futures::future::join_all;
use log::debug;
use log::error;
use log::info;
use log::warn;
use tokio::sync::Mutex;

use crate::message::MessageFormatter;
use crate::notifier::Notifier;
use crate::reminder::ReminderWindows;
use crate::service::error::ServiceError;
use crate::source::FixtureSource;
use crate::store::NotificationLog;
use crate::store::SubscriberStore;

/// Summary of one engine pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    pub fixtures_checked: usize,
    /// Dedup keys recorded during this pass.
    pub sent: Vec<String>,
    pub failed_deliveries: usize,
}

#[derive(Debug, Default)]
struct DeliveryOutcome {
    delivered: usize,
    failed: usize,
}

impl DeliveryOutcome {
    fn all_failed(&self) -> bool {
        self.delivered == 0 && self.failed > 0
    }
}

pub struct ReminderService {
    source: Arc<dyn FixtureSource>,
    subscribers: Arc<SubscriberStore>,
    log: Arc<NotificationLog>,
    notifier: Arc<dyn Notifier>,
    formatter: Arc<MessageFormatter>,
    windows: ReminderWindows,
    pass_lock: Mutex<()>,
}

impl ReminderService {
    pub fn new(
        source: Arc<dyn FixtureSource>,
        subscribers: Arc<SubscriberStore>,
        log: Arc<NotificationLog>,
        notifier: Arc<dyn Notifier>,
        formatter: Arc<MessageFormatter>,
        windows: ReminderWindows,
    ) -> Self {
        Self {
            source,
            subscribers,
            log,
            notifier,
            formatter,
            windows,
            pass_lock: Mutex::new(()),
        }
    }

    /// Runs one pass as of `now`.
    ///
    /// A fetch failure aborts the pass before anything is sent. Once sending
    /// has started the sent log is always written back, even when individual
    /// deliveries fail.
    #[tracing::instrument(skip(self), fields(source = %self.source.info().name))]
    pub async fn run_pass(&self, now: DateTime<Utc>) -> Result<PassReport, ServiceError> {
        let _guard = self.pass_lock.lock().await;

        let fixtures = self.source.fetch_fixtures().await?;
        let recipients = self.subscribers.all().await?;
        let mut sent = self.log.load().await?;
        debug!(
            "Checking {} fixtures for {} subscribers.",
            fixtures.len(),
            recipients.len()
        );

        let mut report = PassReport {
            fixtures_checked: fixtures.len(),
            ..Default::default()
        };

        for fixture in &fixtures {
            for kind in self.windows.due(fixture, now) {
                let key = kind.key(&fixture.id);
                if sent.contains(&key) {
                    continue;
                }

                let text = match self.formatter.reminder(kind, fixture) {
                    Ok(text) => text,
                    Err(e) => {
                        error!("Failed to render {kind} reminder for `{}`: {e}", fixture.id);
                        continue;
                    }
                };

                let outcome = self.deliver(&recipients, &text).await;
                report.failed_deliveries += outcome.failed;
                if outcome.all_failed() {
                    warn!(
                        "Every delivery of `{key}` failed. It will be retried next pass."
                    );
                    continue;
                }

                info!(
                    "Sent {kind} reminder for {} to {}/{} chats.",
                    fixture.title,
                    outcome.delivered,
                    recipients.len()
                );
                sent.insert(key.clone());
                report.sent.push(key);
            }
        }

        self.log.save(&sent).await?;
        Ok(report)
    }

    async fn deliver(&self, recipients: &[i64], text: &str) -> DeliveryOutcome {
        let results = join_all(recipients.iter().map(|&chat_id| async move {
            (chat_id, self.notifier.send(chat_id, text).await)
        }))
        .await;

        let mut outcome = DeliveryOutcome::default();
        for (chat_id, result) in results {
            match result {
                Ok(()) => outcome.delivered += 1,
                Err(e) => {
                    error!("Failed to send message to chat {chat_id}: {e}");
                    outcome.failed += 1;
                }
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::FixedOffset;
    use chrono::TimeDelta;
    use chrono::TimeZone;

    use super::*;
    use crate::notifier::MockNotifier;
    use crate::notifier::NotifyError;
    use crate::source::Fixture;
    use crate::source::SourceInfo;
    use crate::source::error::SourceError;

    struct FixedSource {
        info: SourceInfo,
        fixtures: Vec<Fixture>,
    }

    #[async_trait]
    impl FixtureSource for FixedSource {
        async fn fetch_fixtures(&self) -> Result<Vec<Fixture>, SourceError> {
            Ok(self.fixtures.clone())
        }

        fn info(&self) -> &SourceInfo {
            &self.info
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn temp_dir() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("kickoff-bot-reminder-{}", uuid::Uuid::new_v4()))
    }

    async fn service(
        dir: &std::path::Path,
        fixtures: Vec<Fixture>,
        notifier: MockNotifier,
        chats: &[i64],
    ) -> ReminderService {
        let subscribers = Arc::new(SubscriberStore::new(dir.join("users.json")));
        for chat in chats {
            subscribers.add(*chat).await.unwrap();
        }
        let formatter = MessageFormatter::new(
            FixedOffset::east_opt(0).unwrap(),
            "UTC",
            "Esteghlal",
        )
        .unwrap();
        ReminderService::new(
            Arc::new(FixedSource {
                info: SourceInfo {
                    name: "Fixed".to_string(),
                    api_url: String::new(),
                },
                fixtures,
            }),
            subscribers,
            Arc::new(NotificationLog::new(dir.join("sent_notifications.json"))),
            Arc::new(notifier),
            Arc::new(formatter),
            ReminderWindows::default(),
        )
    }

    #[tokio::test]
    async fn test_partial_failure_still_records_key() {
        let dir = temp_dir();
        let fixture = Fixture::between("9", "A", "B", now() + TimeDelta::minutes(60));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_send()
            .withf(|chat_id, _| *chat_id == 1)
            .times(1)
            .returning(|_, _| Ok(()));
        notifier
            .expect_send()
            .withf(|chat_id, _| *chat_id == 2)
            .times(1)
            .returning(|chat_id, _| {
                Err(NotifyError::Rejected {
                    chat_id,
                    reason: "blocked".to_string(),
                })
            });

        let service = service(&dir, vec![fixture], notifier, &[1, 2]).await;
        let report = service.run_pass(now()).await.unwrap();
        assert_eq!(report.sent, vec!["9_1h".to_string()]);
        assert_eq!(report.failed_deliveries, 1);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_total_failure_is_retried() {
        let dir = temp_dir();
        let fixture = Fixture::between("9", "A", "B", now() + TimeDelta::minutes(60));

        let mut notifier = MockNotifier::new();
        let mut calls = 0;
        notifier.expect_send().times(2).returning(move |chat_id, _| {
            calls += 1;
            if calls == 1 {
                Err(NotifyError::Rejected {
                    chat_id,
                    reason: "network".to_string(),
                })
            } else {
                Ok(())
            }
        });

        let service = service(&dir, vec![fixture], notifier, &[5]).await;
        let first = service.run_pass(now()).await.unwrap();
        assert!(first.sent.is_empty());
        assert_eq!(first.failed_deliveries, 1);

        let second = service.run_pass(now()).await.unwrap();
        assert_eq!(second.sent, vec!["9_1h".to_string()]);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_no_subscribers_still_records_key() {
        let dir = temp_dir();
        let fixture = Fixture::between(
            "3",
            "A",
            "B",
            now() + TimeDelta::hours(24),
        );

        let mut notifier = MockNotifier::new();
        notifier.expect_send().never();

        let service = service(&dir, vec![fixture], notifier, &[]).await;
        let report = service.run_pass(now()).await.unwrap();
        assert_eq!(report.sent, vec!["3_24h".to_string()]);

        let _ = std::fs::remove_dir_all(dir);
    }
}
