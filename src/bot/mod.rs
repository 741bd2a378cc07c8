pub mod callbacks;
pub mod commands;
pub mod handlers;
pub mod menu;
pub mod notifier;
pub mod wizard;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::dptree;
use teloxide::prelude::*;

use crate::config::AppConfig;
use crate::poller::Poller;
use crate::store::SettingsStore;
use wizard::Wizard;

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;
pub type HandlerResult = Result<(), HandlerError>;

/// Shared application state, accessible from all handlers and the scheduler.
pub struct AppState {
    pub config: AppConfig,
    pub settings: SettingsStore,
    pub poller: Poller,
    pub wizard: Wizard,
}

/// Build the teloxide update handler tree.
pub fn build_handler() -> UpdateHandler<HandlerError> {
    let command_handler = Update::filter_message()
        .filter_command::<commands::BotCommand>()
        .endpoint(commands::handle_command);

    let callback_handler = Update::filter_callback_query()
        .endpoint(callbacks::handle_callback);

    let message_handler = Update::filter_message()
        .endpoint(handlers::handle_message);

    dptree::entry()
        .branch(command_handler)
        .branch(callback_handler)
        .branch(message_handler)
}
