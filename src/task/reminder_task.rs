//! Background task that runs the reminder engine on a fixed interval.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::anyhow;
use chrono::Utc;
use log::debug;
use log::error;
use log::info;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;

use crate::service::reminder_service::ReminderService;

pub struct ReminderTask {
    service: Arc<ReminderService>,
    poll_interval: Duration,
    first_run_delay: Duration,
    running: AtomicBool,
    shutdown: Notify,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ReminderTask {
    pub fn new(
        service: Arc<ReminderService>,
        poll_interval: Duration,
        first_run_delay: Duration,
    ) -> Arc<Self> {
        info!(
            "Initializing ReminderTask with poll interval {:?} (first run after {:?})",
            poll_interval, first_run_delay
        );
        Arc::new(Self {
            service,
            poll_interval,
            first_run_delay,
            running: AtomicBool::new(false),
            shutdown: Notify::new(),
            handle: Mutex::new(None),
        })
    }

    /// Starts the polling loop. Calling it again while running is a no-op.
    pub fn start(self: Arc<Self>) -> anyhow::Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        info!("Starting ReminderTask check loop.");
        let handle = self.clone().spawn_check_loop();
        *self
            .handle
            .lock()
            .map_err(|_| anyhow!("ReminderTask handle lock poisoned"))? = Some(handle);
        Ok(())
    }

    /// Stops the loop and waits for it to exit.
    ///
    /// A pass already in progress runs to completion, so its sent log is saved.
    pub async fn stop(&self) -> anyhow::Result<()> {
        info!("Stopping ReminderTask check loop.");
        self.running.store(false, Ordering::SeqCst);
        self.shutdown.notify_one();

        let handle = self
            .handle
            .lock()
            .map_err(|_| anyhow!("ReminderTask handle lock poisoned"))?
            .take();
        if let Some(handle) = handle {
            handle.await?;
        }
        info!("ReminderTask stopped.");
        Ok(())
    }

    fn spawn_check_loop(self: Arc<Self>) -> JoinHandle<()> {
        let start = Instant::now() + self.first_run_delay;
        let mut interval = tokio::time::interval_at(start, self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    _ = self.shutdown.notified() => break,
                }
                if !self.running.load(Ordering::SeqCst) {
                    break;
                }
                if let Err(e) = self.check_reminders().await {
                    error!("Error checking reminders: {}", e);
                }
            }
            info!("Check loop exited.");
        })
    }

    async fn check_reminders(&self) -> anyhow::Result<()> {
        debug!("Checking for due reminders.");
        let report = self.service.run_pass(Utc::now()).await?;
        if report.sent.is_empty() {
            debug!(
                "No reminders due ({} fixtures checked).",
                report.fixtures_checked
            );
        } else {
            info!(
                "Sent {} reminders ({} failed deliveries): {}",
                report.sent.len(),
                report.failed_deliveries,
                report.sent.join(", ")
            );
        }
        Ok(())
    }
}
