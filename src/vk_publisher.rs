use crate::{
    config,
    domain::{PhotoUrl, VkGroupId},
    relay::Publisher,
    vk_api,
};
use anyhow::Context;
use async_trait::async_trait;

/// Публикует посты на стене сообщества ВКонтакте.
///
/// Фотографии загружаются с токеном пользователя, а сама запись
/// публикуется с токеном сообщества.
pub struct VkPublisher {
    http: reqwest::Client,
    group: vk_api::Client,
    user: vk_api::Client,
    group_id: VkGroupId,
}

impl VkPublisher {
    pub fn new(config: &config::Vk) -> anyhow::Result<Self> {
        let debug = config.debug.as_ref().map(vk_api::ClientDebug::from);

        Ok(Self {
            http: reqwest::Client::new(),
            group: vk_api::Client::new(
                &config.server,
                &config.group_token,
                &config.language,
                debug.clone(),
            )
            .context("creating vk client with group token")?,
            user: vk_api::Client::new(
                &config.server,
                &config.user_token,
                &config.language,
                debug,
            )
            .context("creating vk client with user token")?,
            group_id: VkGroupId(config.group_id),
        })
    }

    async fn upload_photo(&self, url: &PhotoUrl) -> anyhow::Result<String> {
        let bytes = self.download_photo(url).await?;

        let server = self
            .user
            .get_wall_upload_server(self.group_id)
            .await
            .context("getting upload server")?;

        let uploaded = self
            .user
            .upload_wall_photo(&server.upload_url, bytes)
            .await?;

        let saved = self
            .user
            .save_wall_photo(self.group_id, &uploaded)
            .await
            .context("saving uploaded photo")?;

        Ok(saved.attachment())
    }

    /// Скачивает фотографию. URL содержит токен бота, поэтому он вырезается из ошибок.
    async fn download_photo(&self, url: &PhotoUrl) -> anyhow::Result<Vec<u8>> {
        let bytes = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("requesting photo")?
            .error_for_status()
            .map_err(reqwest::Error::without_url)
            .context("requesting photo")?
            .bytes()
            .await
            .map_err(reqwest::Error::without_url)
            .context("downloading photo")?;

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl Publisher for VkPublisher {
    async fn publish(&self, text: &str, photos: &[PhotoUrl]) -> anyhow::Result<()> {
        let mut attachments = Vec::with_capacity(photos.len());

        for url in photos {
            match self.upload_photo(url).await {
                Ok(attachment) => attachments.push(attachment),
                Err(err) => log::warn!("Failed to upload photo to VK: {err:#}"),
            }
        }

        let post = self
            .group
            .post_to_wall(self.group_id, text, &attachments)
            .await
            .with_context(|| format!("posting to {}", self.group_id))?;

        log::debug!(
            "Successfully posted {post_id} with {count} photos to {group}",
            post_id = post.post_id,
            count = attachments.len(),
            group = self.group_id,
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publisher() -> VkPublisher {
        VkPublisher::new(&config::Vk {
            server: url::Url::parse("https://api.vk.com/").unwrap(),
            language: "ru".to_owned(),
            group_token: "group".to_owned(),
            user_token: "user".to_owned(),
            group_id: 229000111,
            debug: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn failed_download_does_not_expose_bot_token() {
        let url =
            PhotoUrl::parse("http://127.0.0.1:1/file/botSECRET123:TOKEN/photos/a.jpg").unwrap();

        let err = publisher().upload_photo(&url).await.unwrap_err();
        let message = format!("{err:#}");

        assert!(message.starts_with("requesting photo"), "{message}");
        assert!(!message.contains("SECRET123"), "{message}");
    }
}
