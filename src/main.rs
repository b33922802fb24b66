use anyhow::Result;
use rusqlite::Connection;
use std::sync::Arc;
use std::time::Duration;
use teloxide::dispatching::dialogue::{self, InMemStorage};
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use tokio::sync::Mutex;
use tracing::info;

use realtybot::bot;
use realtybot::cache::SystemClock;
use realtybot::config::BotConfig;
use realtybot::db;
use realtybot::dialogue::ConversationState;
use realtybot::localization;
use realtybot::sheets::SheetsService;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting Realty Telegram Bot");

    localization::init_localization()?;

    let config = Arc::new(BotConfig::from_env()?);

    info!("Initializing database at: {}", config.database_path);
    let conn = Connection::open(&config.database_path)?;
    db::init_database_schema(&conn)?;
    let conn = Arc::new(Mutex::new(conn));

    let sheets = Arc::new(SheetsService::new(
        config.sheets.clone(),
        config.retry.clone(),
        Duration::from_secs(config.cache_ttl_secs),
        Arc::new(SystemClock),
    ));

    let bot = Bot::new(&config.bot_token);
    register_commands(&bot).await?;

    info!("Bot initialized, starting dispatcher");

    let handler = dialogue::enter::<Update, InMemStorage<ConversationState>, ConversationState, _>()
        .branch(Update::filter_message().endpoint(bot::message_handler))
        .branch(Update::filter_callback_query().endpoint(bot::callback_handler));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![
            config,
            sheets,
            conn,
            InMemStorage::<ConversationState>::new()
        ])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// Register the command menu shown by Telegram clients
async fn register_commands(bot: &Bot) -> Result<()> {
    bot.set_my_commands(vec![
        BotCommand::new("start", "Open the main menu"),
        BotCommand::new("search", "Search for listings"),
        BotCommand::new("calculators", "Mortgage and yield calculators"),
        BotCommand::new("cancel", "Cancel the current action"),
        BotCommand::new("help", "How to use the bot"),
    ])
    .await?;
    Ok(())
}
