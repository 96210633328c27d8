mod config;
mod config_validators;
mod domain;
mod filter;
mod relay;
mod tg;
mod utils;
mod vk_api;
mod vk_publisher;

use anyhow::Context;
use argh::FromArgs;
use std::{path::PathBuf, process, sync::Arc};
use tokio_util::sync::CancellationToken;

/// Пересылка постов из Telegram канала на стену сообщества ВКонтакте.
#[derive(FromArgs)]
struct Args {
    /// путь до файла конфигурации
    #[argh(option, short = 'c', default = "PathBuf::from(\"config.toml\")")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    if let Err(err) = simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()
    {
        eprintln!("Failed to init logger: {err}");
        process::exit(1);
    }

    hello();

    let args: Args = argh::from_env();

    match run(args).await {
        Ok(()) => {
            process::exit(0);
        }
        Err(err) => {
            log::error!("Fatal error: {err:#}");
            process::exit(1);
        }
    }
}

fn hello() {
    log::info!(
        "{name} version {version}",
        name = env!("CARGO_BIN_NAME"),
        version = env!("CARGO_PKG_VERSION")
    );
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = config::Config::read_from(&args.config).context("reading config")?;

    let bot = teloxide::Bot::new(&config.telegram.bot_token);
    let channel_id = domain::TelegramChannelId(config.telegram.channel_id);

    let relay = relay::Relay::new(
        config.relay.clone(),
        filter::TextFilter::new(&config.filter).context("creating text filter")?,
        Arc::new(tg::TelegramPhotoResolver::new(bot.clone())),
        Arc::new(vk_publisher::VkPublisher::new(&config.vk).context("creating vk publisher")?),
    );

    log::info!(
        "Relaying posts from {channel_id} to {group}",
        group = domain::VkGroupId(config.vk.group_id)
    );

    let token = CancellationToken::new();

    let listener = tokio::spawn(tg::run_listener(
        bot,
        channel_id,
        relay.clone(),
        token.clone(),
    ));
    let sweeper = tokio::spawn(relay::sweeper::run(relay, token.clone()));

    tokio::signal::ctrl_c()
        .await
        .context("waiting for ctrl-c")?;

    log::info!("Shutting down...");
    token.cancel();

    _ = tokio::join!(listener, sweeper);

    Ok(())
}
