use std::sync::Arc;

use tracing::info;

use chgk_core::{bot::Bot, config::Config, store::MemoryStore};
use chgk_telegram::{TelegramMessenger, TelegramUpdateSource, TgClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    chgk_core::logging::init("chgk");

    let cfg = Arc::new(Config::load()?);

    let client = TgClient::new(&cfg.bot_token)?;
    let source = Arc::new(TelegramUpdateSource::new(client.clone()));
    let messenger = Arc::new(TelegramMessenger::new(client));
    let store = Arc::new(MemoryStore::with_default_bank().await);

    let bot = Bot::start(cfg, source, messenger, store);
    info!("chgk bot running, press ctrl-c to stop");

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");
    bot.stop().await;

    Ok(())
}
