use std::path::Path;
use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing_subscriber::EnvFilter;

mod bot;
mod config;
mod divar;
mod error;
mod health;
mod poller;
mod store;

use bot::commands::BotCommand;
use bot::notifier::TelegramNotifier;
use config::AppConfig;
use divar::{DivarClient, MarketScope};
use poller::cycle::MAX_PHOTOS;
use poller::{CycleOptions, Poller};
use store::SettingsStore;

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

    tracing::info!("🏠 Starting Divar scout bot...");

    // Missing token is fatal
    let config = AppConfig::from_env()?;
    tracing::info!(
        "Config loaded. Searching {} in {}",
        config.divar_category,
        config.divar_city
    );

    // Persisted state
    let settings = SettingsStore::open(&config.settings_path).await;
    let seen = store::load_seen(Path::new(&config.seen_path), config.seen_cap).await;
    if seen.is_empty() {
        tracing::info!("No seen listings yet, the first check delivers the newest window");
    } else {
        tracing::info!("Loaded {} seen listings from {}", seen.len(), config.seen_path);
    }

    // Marketplace + poller
    let scope = MarketScope {
        city: config.divar_city.clone(),
        category: config.divar_category.clone(),
    };
    let source = DivarClient::new(scope.clone(), config.request_timeout)?;
    let options = CycleOptions {
        scope,
        window: config.window_size,
        enrich_delay: config.enrich_delay,
        max_photos: MAX_PHOTOS,
    };
    let poller = Poller::new(Arc::new(source), options, seen, &config.seen_path);

    let state = Arc::new(bot::AppState {
        config: config.clone(),
        settings,
        poller,
        wizard: Default::default(),
    });

    health::spawn(config.port);

    // Create the Telegram bot
    let bot = Bot::new(&config.telegram_bot_token);

    if let Err(e) = bot.set_my_commands(BotCommand::bot_commands()).await {
        tracing::warn!("Could not register bot commands: {}", e);
    }

    match config.chat_id {
        Some(chat_id) => {
            poller::scheduler::spawn(
                state.clone(),
                Arc::new(TelegramNotifier::new(bot.clone())),
                ChatId(chat_id),
                config.first_run_delay,
                config.poll_interval,
            );
        }
        None => tracing::warn!("CHAT_ID not set, scheduled polling disabled; /update still works"),
    }

    // Build the dispatcher
    let handler = bot::build_handler();

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
