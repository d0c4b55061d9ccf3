use std::sync::Arc;

use teloxide::prelude::*;
use tracing_subscriber::EnvFilter;

mod ai;
mod bot;
mod config;
mod content;
mod db;
mod error;
mod prompts;
mod publisher;
mod scheduler;

#[cfg(test)]
mod testing;

use config::AppConfig;
use content::{AnalyticsLedger, Catalog, UsageLedger};
use db::{Database, KvStore};
use publisher::{ImageSearch, Publisher, TelegramChannel};
use scheduler::{PostingMessage, PostingScheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("🤖 Starting rap channel bot...");

    // Load config
    let config = AppConfig::from_env()?;
    tracing::info!("Config loaded. Model: {}", config.model_name);

    // Initialize database
    let db = Database::connect(&config.database_url).await?;
    db.run_migrations().await?;
    tracing::info!("Database connected and migrations applied.");
    let store: Arc<dyn KvStore> = Arc::new(db);

    // Topics and tracks
    let catalog = Arc::new(Catalog::load(store.as_ref(), &config.topics_path, &config.tracks_path).await?);

    // Ledgers own their records from here on
    let usage = UsageLedger::spawn(store.clone());
    let analytics = AnalyticsLedger::spawn(store.clone());

    // External collaborators
    let generator: Arc<dyn ai::ContentGenerator> = Arc::new(ai::llm::LlmClient::new(&config));
    let images: Arc<dyn ai::ImageProvider> = Arc::new(ai::image::UnsplashClient::new(&config));

    // Create the Telegram bot
    let bot = Bot::new(&config.telegram_bot_token);
    let channel = Arc::new(TelegramChannel::new(bot.clone(), config.channel.clone()));

    let publisher = Arc::new(Publisher::new(
        catalog.clone(),
        usage.clone(),
        generator.clone(),
        images,
        ImageSearch {
            query: config.image_query.clone(),
            orientation: config.image_orientation,
        },
        channel,
    ));
    let (scheduler, posting) = PostingScheduler::new(publisher, config.post_interval);
    let scheduler_task = tokio::spawn(scheduler.run());

    // Build shared application state
    let state = Arc::new(bot::AppState {
        config: config.clone(),
        router: bot::router::CommandRouter::new(generator, analytics, usage, catalog),
        posting: posting.clone(),
    });

    // Build the dispatcher
    let handler = bot::build_handler();

    tracing::info!("⏰ Bot started, waiting for updates...");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    posting.send(PostingMessage::Shutdown).await.ok();
    scheduler_task.await?;

    Ok(())
}
