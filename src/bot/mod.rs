pub mod callbacks;
pub mod commands;
pub mod handlers;
pub mod router;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::dptree;
use teloxide::prelude::*;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::scheduler::PostingMessage;
use router::CommandRouter;

/// Shared application state, accessible from all handlers.
pub struct AppState {
    pub config: AppConfig,
    pub router: CommandRouter,
    pub posting: mpsc::Sender<PostingMessage>,
}

/// Build the teloxide update handler tree.
pub fn build_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
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
