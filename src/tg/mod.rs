mod listener;
mod resolver;

use crate::{domain::TelegramChannelId, relay::Relay};
use teloxide::{payloads::DeleteWebhookSetters, requests::Requester, Bot};
use tokio_util::sync::CancellationToken;

pub use resolver::TelegramPhotoResolver;

pub async fn run_listener(
    bot: Bot,
    channel_id: TelegramChannelId,
    relay: Relay,
    token: CancellationToken,
) {
    // Посты, пришедшие пока бот был выключен, не пересылаются.
    if let Err(err) = bot.delete_webhook().drop_pending_updates(true).await {
        log::warn!("Failed to delete webhook: {err}");
    }

    log::info!("Listening for posts in channel {channel_id}");

    let shutdown_token = listener::start(bot, channel_id, relay);

    token.cancelled().await;

    match shutdown_token.shutdown() {
        Ok(shutdown) => shutdown.await,
        Err(err) => log::warn!("Failed to stop telegram dispatcher: {err}"),
    }

    log::info!("Telegram listener stopped");
}
