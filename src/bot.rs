//! Telegram front end: command dispatch for `/start`, `/next` and `/help`.

pub mod commands;

use std::sync::Arc;

use log::info;
use log::trace;
use teloxide::dispatching::Dispatcher;
use teloxide::dispatching::HandlerExt;
use teloxide::dispatching::UpdateFilterExt;
use teloxide::dptree;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::types::Update;

use crate::bot::commands::Command;
use crate::config::Config;
use crate::service::Services;

/// State shared with every command handler.
pub struct Data {
    pub config: Arc<Config>,
    pub services: Arc<Services>,
}

pub struct Bot {
    client: teloxide::Bot,
    data: Arc<Data>,
}

impl Bot {
    pub fn new(client: teloxide::Bot, config: Arc<Config>, services: Arc<Services>) -> Self {
        info!("Initializing bot...");
        Self {
            client,
            data: Arc::new(Data { config, services }),
        }
    }

    /// Spawns the long-polling dispatcher.
    pub fn start(&self) {
        info!("Starting bot client...");
        let handler = Update::filter_message()
            .filter_command::<Command>()
            .endpoint(commands::answer);

        let mut dispatcher = Dispatcher::builder(self.client.clone(), handler)
            .dependencies(dptree::deps![self.data.clone()])
            .default_handler(|upd| async move {
                trace!("Unhandled update: {:?}", upd.id);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the command dispatcher",
            ))
            .build();

        tokio::spawn(async move {
            info!("Connecting bot to Telegram...");
            dispatcher.dispatch().await;
            info!("Bot dispatcher stopped.");
        });

        info!("Bot client start initiated.");
    }
}
