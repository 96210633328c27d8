use crate::{
    domain::{InboundPost, MediaGroupId, PhotoRef, TelegramChannelId},
    relay::Relay,
};
use teloxide::{
    dispatching::{ShutdownToken, UpdateHandler},
    prelude::*,
};
use chrono::Utc;
use tokio::time::Instant;

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

pub fn start(bot: Bot, channel_id: TelegramChannelId, relay: Relay) -> ShutdownToken {
    let mut dispatcher = Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![channel_id, relay])
        .default_handler(|_| async {})
        .build();

    let token = dispatcher.shutdown_token();

    tokio::spawn(async move {
        dispatcher.dispatch().await;
    });

    token
}

fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    Update::filter_channel_post().endpoint(channel_post)
}

async fn channel_post(msg: Message, channel_id: TelegramChannelId, relay: Relay) -> HandlerResult {
    if !is_from_channel(&msg, channel_id) {
        log::debug!("Ignore post from foreign chat {}", msg.chat.id);
        return Ok(());
    }

    relay.handle(to_inbound(&msg)).await;

    Ok(())
}

fn is_from_channel(msg: &Message, channel_id: TelegramChannelId) -> bool {
    msg.chat.id.0 == channel_id.0
}

fn to_inbound(msg: &Message) -> InboundPost {
    InboundPost {
        group_id: msg
            .media_group_id()
            .map(|id| MediaGroupId(id.to_owned())),
        text: msg.text().or(msg.caption()).unwrap_or_default().to_owned(),
        photo: msg
            .photo()
            .and_then(|sizes| sizes.last())
            .map(|size| PhotoRef(size.file.id.clone())),
        received_at: received_at(msg),
    }
}

/// Переводит время публикации из Telegram в монотонное время.
fn received_at(msg: &Message) -> Instant {
    let now = Instant::now();

    (Utc::now() - msg.date)
        .to_std()
        .ok()
        .and_then(|age| now.checked_sub(age))
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const CHANNEL: TelegramChannelId = TelegramChannelId(-1001234567890);

    fn message(chat_id: i64, date: i64, extra: &str) -> Message {
        let raw = format!(
            r#"{{
                "message_id": 10,
                "date": {date},
                "chat": {{"id": {chat_id}, "type": "channel", "title": "Грузы"}},
                "sender_chat": {{"id": {chat_id}, "type": "channel", "title": "Грузы"}}
                {extra}
            }}"#
        );

        serde_json::from_str::<Message>(&raw).unwrap()
    }

    fn photo_sizes() -> &'static str {
        r#"[
            {"file_id": "small", "file_unique_id": "s", "width": 90, "height": 68, "file_size": 1200},
            {"file_id": "medium", "file_unique_id": "m", "width": 320, "height": 240, "file_size": 15000},
            {"file_id": "large", "file_unique_id": "l", "width": 1280, "height": 960, "file_size": 98000}
        ]"#
    }

    #[test]
    fn foreign_chat_is_ignored() {
        let now = Utc::now().timestamp();

        assert!(is_from_channel(&message(CHANNEL.0, now, r#", "text": "рейс""#), CHANNEL));
        assert!(!is_from_channel(&message(-1009876543210, now, r#", "text": "рейс""#), CHANNEL));
    }

    #[test]
    fn text_post_is_converted() {
        let msg = message(CHANNEL.0, Utc::now().timestamp(), r#", "text": "Новый рейс""#);
        let post = to_inbound(&msg);

        assert_eq!(post.text, "Новый рейс");
        assert_eq!(post.group_id, None);
        assert_eq!(post.photo, None);
    }

    #[test]
    fn photo_post_takes_caption_and_largest_size() {
        let extra = format!(r#", "caption": "Москва - Казань", "photo": {}"#, photo_sizes());
        let msg = message(CHANNEL.0, Utc::now().timestamp(), &extra);
        let post = to_inbound(&msg);

        assert_eq!(post.text, "Москва - Казань");
        assert_eq!(post.photo, Some(PhotoRef("large".to_owned())));
        assert_eq!(post.group_id, None);
    }

    #[test]
    fn album_part_keeps_media_group_id() {
        let extra = format!(r#", "media_group_id": "13579", "photo": {}"#, photo_sizes());
        let msg = message(CHANNEL.0, Utc::now().timestamp(), &extra);
        let post = to_inbound(&msg);

        assert_eq!(post.group_id, Some(MediaGroupId("13579".to_owned())));
        assert_eq!(post.text, "");
        assert_eq!(post.photo, Some(PhotoRef("large".to_owned())));
    }

    #[test]
    fn received_at_follows_message_date() {
        let msg = message(CHANNEL.0, Utc::now().timestamp() - 3, r#", "text": "рейс""#);
        let post = to_inbound(&msg);

        assert!(post.received_at.elapsed() >= Duration::from_secs(2));
    }
}
