mod media_group;
pub mod sweeper;

use crate::{
    config,
    domain::{InboundPost, MediaGroupId, PhotoRef, PhotoUrl},
    filter::{Filtered, TextFilter},
};
use async_trait::async_trait;
use media_group::{Accepted, Dispatch, GroupStore};
use std::sync::Arc;
use tokio::{sync::Mutex, time::Instant};

/// Превращает ссылку на фотографию в URL, откуда её можно скачать.
#[async_trait]
pub trait PhotoResolver: Send + Sync {
    async fn resolve(&self, photo: &PhotoRef) -> anyhow::Result<PhotoUrl>;
}

/// Публикует пост на стороне получателя.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, text: &str, photos: &[PhotoUrl]) -> anyhow::Result<()>;
}

/// Пересылка постов: фильтрует текст, собирает альбомы и вызывает [`Publisher`].
#[derive(Clone)]
pub struct Relay {
    inner: Arc<Inner>,
}

struct Inner {
    settings: config::Relay,
    filter: TextFilter,
    resolver: Arc<dyn PhotoResolver>,
    publisher: Arc<dyn Publisher>,
    groups: Mutex<GroupStore>,
}

impl Relay {
    pub fn new(
        settings: config::Relay,
        filter: TextFilter,
        resolver: Arc<dyn PhotoResolver>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                settings,
                filter,
                resolver,
                publisher,
                groups: Mutex::new(GroupStore::default()),
            }),
        }
    }

    pub fn settings(&self) -> &config::Relay {
        &self.inner.settings
    }

    pub async fn handle(&self, post: InboundPost) {
        log::debug!(
            "Handling channel post received {:?} ago",
            post.received_at.elapsed()
        );

        match post.group_id.clone() {
            Some(id) => self.handle_group_part(id, post).await,
            None => self.handle_single(post).await,
        }
    }

    async fn handle_single(&self, post: InboundPost) {
        if post.text.is_empty() && post.photo.is_none() {
            log::debug!("Skip channel post without text and photo");
            return;
        }

        let text = match self.inner.filter.filter(&post.text) {
            Filtered::Publish(text) => text,
            Filtered::Drop => {
                return log::info!("Skip post with giveaway: '{}'", preview(&post.text));
            }
        };

        let mut photos = Vec::new();
        if let Some(photo) = &post.photo {
            photos.extend(self.resolve(photo).await);
        }

        self.publish(&text, &photos).await;
    }

    async fn handle_group_part(&self, id: MediaGroupId, post: InboundPost) {
        if self.inner.groups.lock().await.is_completed(&id) {
            return log::debug!("Media group {id} is already completed");
        }

        let photo = match &post.photo {
            Some(photo) => self.resolve(photo).await,
            None => None,
        };

        let accepted = self
            .inner
            .groups
            .lock()
            .await
            .accept(&id, &post.text, photo, Instant::now());

        match accepted {
            Accepted::AlreadyCompleted => {
                log::debug!("Media group {id} is already completed");
            }
            Accepted::Buffered => {
                log::debug!("Buffered part of media group {id}");
            }
            Accepted::ScheduleDispatch => {
                let relay = self.clone();
                let delay = self.inner.settings.quiescence_delay();

                log::debug!("Media group {id} will be dispatched in {delay:?}");

                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    relay.dispatch(&id).await;
                });
            }
        }
    }

    async fn dispatch(&self, id: &MediaGroupId) {
        let dispatch = self
            .inner
            .groups
            .lock()
            .await
            .take_for_dispatch(id, Instant::now());

        let (text, photos) = match dispatch {
            Dispatch::Missing => {
                return log::debug!("Media group {id} was removed before dispatch");
            }
            Dispatch::NoPhotos => {
                return log::warn!("Media group {id} has no photos, leaving it pending");
            }
            Dispatch::Ready { text, photos } => (text, photos),
        };

        match self.inner.filter.filter(&text) {
            Filtered::Publish(text) => self.publish(&text, &photos).await,
            Filtered::Drop => {
                log::info!("Skip media group {id} with giveaway: '{}'", preview(&text));
            }
        }
    }

    /// Удаляет устаревшие альбомы. Возвращает количество удалённых.
    pub async fn sweep(&self) -> usize {
        let settings = &self.inner.settings;

        let mut groups = self.inner.groups.lock().await;

        let swept = groups.sweep(
            Instant::now(),
            settings.staleness_threshold(),
            settings.completed_ttl(),
        );

        for id in &swept {
            log::info!("Removed stale media group {id}");
        }

        log::debug!(
            "Media groups after sweep: {pending} pending, {completed} completed",
            pending = groups.pending_len(),
            completed = groups.completed_len(),
        );

        swept.len()
    }

    async fn resolve(&self, photo: &PhotoRef) -> Option<PhotoUrl> {
        match self.inner.resolver.resolve(photo).await {
            Ok(url) => Some(url),
            Err(err) => {
                log::warn!("Failed to resolve photo '{}': {err:#}", photo.0);
                None
            }
        }
    }

    async fn publish(&self, text: &str, photos: &[PhotoUrl]) {
        match self.inner.publisher.publish(text, photos).await {
            Ok(()) => log::info!(
                "Successfully relayed post '{text}' with {count} photos",
                text = preview(text),
                count = photos.len(),
            ),
            Err(err) => log::error!(
                "Failed to relay post '{text}': {err:#}",
                text = preview(text),
            ),
        }
    }

    #[cfg(test)]
    async fn pending_groups(&self) -> usize {
        self.inner.groups.lock().await.pending_len()
    }
}

fn preview(text: &str) -> String {
    text.chars().take(50).collect()
}
