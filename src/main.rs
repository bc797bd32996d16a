//! Application entry point for kickoff-bot.
//!
//! Initializes all components, starts the reminder task and the Telegram bot.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use dotenv::dotenv;
use kickoff_bot::bot::Bot;
use kickoff_bot::config::Config;
use kickoff_bot::logging::setup_logging;
use kickoff_bot::notifier::Notifier;
use kickoff_bot::notifier::log_notifier::LogNotifier;
use kickoff_bot::notifier::telegram_notifier::TelegramNotifier;
use kickoff_bot::service::Services;
use kickoff_bot::source::create_source;
use kickoff_bot::task::reminder_task::ReminderTask;
use log::debug;
use log::info;
use tracing_appender::non_blocking::WorkerGuard;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let init_start = Instant::now();
    let (config, _log_guard) = load_config()?;
    let client = teloxide::Bot::new(&config.bot_token);

    let services = setup_services(&config, &client, init_start).await?;
    let task = setup_reminder_task(&config, &services, init_start)?;
    setup_bot(&config, client, &services, init_start);

    run(init_start).await?;
    task.stop().await?;
    Ok(())
}

fn load_config() -> Result<(Arc<Config>, WorkerGuard)> {
    let config = Arc::new(Config::from_env()?);
    let guard = setup_logging(&config)?;
    info!("Starting kickoff-bot...");
    debug!("Loaded configuration for team {} ({}).", config.team_name, config.team_id);
    Ok((config, guard))
}

async fn setup_services(
    config: &Config,
    client: &teloxide::Bot,
    init_start: Instant,
) -> Result<Arc<Services>> {
    debug!("Setting up Services...");
    let source = create_source(config)?;
    info!("Using fixture source {}.", source.info().name);

    let notifier: Arc<dyn Notifier> = if config.dry_run {
        Arc::new(LogNotifier::new())
    } else {
        Arc::new(TelegramNotifier::new(client.clone(), config.send_rate))
    };

    let services = Arc::new(Services::new(config, source, notifier)?);
    let subscribers = services.subscription.subscribers().await?;
    info!(
        "Services setup complete with {} subscribers ({:.2}s).",
        subscribers.len(),
        init_start.elapsed().as_secs_f64()
    );
    Ok(services)
}

fn setup_reminder_task(
    config: &Config,
    services: &Services,
    init_start: Instant,
) -> Result<Arc<ReminderTask>> {
    debug!("Setting up ReminderTask...");
    let task = ReminderTask::new(
        services.reminder.clone(),
        config.poll_interval,
        config.first_run_delay,
    );
    task.clone().start()?;
    info!(
        "ReminderTask setup complete ({:.2}s).",
        init_start.elapsed().as_secs_f64()
    );
    Ok(task)
}

fn setup_bot(
    config: &Arc<Config>,
    client: teloxide::Bot,
    services: &Arc<Services>,
    init_start: Instant,
) {
    if config.dry_run {
        info!("Dry run: Telegram commands are disabled.");
        return;
    }
    let bot = Bot::new(client, config.clone(), services.clone());
    bot.start();
    info!(
        "Bot setup complete ({:.2}s).",
        init_start.elapsed().as_secs_f64()
    );
}

async fn run(init_start: Instant) -> Result<()> {
    info!(
        "kickoff-bot is up in {:.2}s. Press Ctrl+C to stop.",
        init_start.elapsed().as_secs_f64()
    );

    tokio::signal::ctrl_c().await?;
    info!("Ctrl+C received, shutting down.");

    Ok(())
}
