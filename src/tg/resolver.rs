use crate::{
    domain::{PhotoRef, PhotoUrl},
    relay::PhotoResolver,
};
use anyhow::Context;
use async_trait::async_trait;
use teloxide::{requests::Requester, Bot};

/// Получает ссылку на файл фотографии через `getFile`.
///
/// Ссылка содержит токен бота, поэтому её нельзя логировать.
pub struct TelegramPhotoResolver {
    bot: Bot,
}

impl TelegramPhotoResolver {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl PhotoResolver for TelegramPhotoResolver {
    async fn resolve(&self, photo: &PhotoRef) -> anyhow::Result<PhotoUrl> {
        let file = self
            .bot
            .get_file(photo.0.clone())
            .await
            .context("requesting file info from telegram")?;

        file_url(&self.bot.api_url(), self.bot.token(), &file.path)
    }
}

fn file_url(api_url: &PhotoUrl, token: &str, path: &str) -> anyhow::Result<PhotoUrl> {
    api_url
        .join(&format!("file/bot{token}/{path}"))
        .context("building file url")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_download_url() {
        let api_url = PhotoUrl::parse("https://api.telegram.org").unwrap();
        let url = file_url(&api_url, "123:abc", "photos/file_7.jpg").unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.telegram.org/file/bot123:abc/photos/file_7.jpg"
        );
    }
}
