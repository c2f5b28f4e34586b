//! Gatekeeper - Telegram join verification bot
//!
//! Mutes every new group member until they press an "I am not a bot"
//! button, and removes members who don't within the challenge window.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `database` - MongoDB integration
//! - `cache` - LRU-based caching with Moka
//! - `permissions` - Admin checking with caching
//! - `verification` - Join, click, expiry and departure handlers
//! - `bot` - Telegram client, dispatcher and runners (with Throttle)
//! - `plugins` - Command and callback handlers
//! - `events` - Service message handlers
//! - `i18n` - User-facing texts
//! - `utils` - Utility functions

mod bot;
mod cache;
mod config;
mod database;
mod events;
mod i18n;
mod permissions;
mod plugins;
mod utils;
mod verification;

use std::sync::Arc;

use teloxide::adaptors::throttle::Limits;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bot::{AppState, TelegramGateway};
use config::Config;
use database::{ChatRepository, Database};
use i18n::Translations;
use verification::{GateSettings, Gatekeeper, TextProvider, TokioTimer, UnmuteControls};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gatekeeper=info,teloxide=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    info!("Starting gatekeeper bot...");

    let config = Config::from_env()?;
    info!("Configuration loaded successfully");
    info!("Bot mode: {:?}", config.bot_mode);

    info!("Connecting to MongoDB...");
    let db = Database::connect(&config.mongodb_uri, &config.mongodb_database).await?;
    db.ensure_indexes().await?;
    info!("Database connected");

    // Throttle keeps us within Telegram's global and per-chat rate limits
    let bot = Bot::new(&config.bot_token).throttle(Limits::default());

    let me = bot.get_me().await?;
    info!("Bot username: @{}", me.username());

    let text: Arc<dyn TextProvider> = Arc::new(Translations::english());
    let settings = GateSettings {
        bot_id: me.id,
        challenge_timeout: config.challenge_timeout,
        unmute_grace: config.unmute_grace,
    };

    let gatekeeper = Gatekeeper {
        gateway: Arc::new(TelegramGateway::new(bot.clone())),
        store: Arc::new(ChatRepository::new(&db)),
        text: text.clone(),
        controls: Arc::new(UnmuteControls::new(text)),
        timer: Arc::new(TokioTimer),
        settings,
    };

    if config.allowed_chats.is_empty() {
        info!("Serving every chat (ALLOWED_CHATS is empty)");
    } else {
        info!("Serving chats: {:?}", config.allowed_chats);
    }

    let state = AppState::new(gatekeeper, config.allowed_chats.clone());
    let dispatcher = bot::build_dispatcher(bot.clone(), state);

    bot::run(&config, bot, dispatcher).await
}
