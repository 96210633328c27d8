use crate::domain::{MediaGroupId, PhotoUrl};
use std::{collections::HashMap, time::Duration};
use tokio::time::Instant;

/// Состояние альбома, части которого ещё приходят.
#[derive(Debug)]
struct PendingGroup {
    text: String,
    photos: Vec<PhotoUrl>,
    last_update: Instant,
    dispatch_started: bool,
}

/// Что делать после приёма части альбома.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accepted {
    /// Альбом уже опубликован или отброшен фильтром.
    AlreadyCompleted,

    /// Часть сохранена, публикация уже запланирована.
    Buffered,

    /// Первая часть альбома: нужно запланировать публикацию.
    ScheduleDispatch,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Альбом удалён как устаревший, пока ждали.
    Missing,

    /// Ни одной фотографии. Альбом остаётся ждать сборщика мусора.
    NoPhotos,

    /// Альбом забран на публикацию и помечен завершённым.
    Ready {
        text: String,
        photos: Vec<PhotoUrl>,
    },
}

/// Хранилище альбомов: собираемые и уже завершённые.
///
/// Идентификатор альбома находится либо в `pending`, либо в `completed`,
/// но никогда в обоих сразу.
#[derive(Debug, Default)]
pub struct GroupStore {
    pending: HashMap<MediaGroupId, PendingGroup>,
    completed: HashMap<MediaGroupId, Instant>,
}

impl GroupStore {
    pub fn is_completed(&self, id: &MediaGroupId) -> bool {
        self.completed.contains_key(id)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn completed_len(&self) -> usize {
        self.completed.len()
    }

    pub fn accept(
        &mut self,
        id: &MediaGroupId,
        text: &str,
        photo: Option<PhotoUrl>,
        now: Instant,
    ) -> Accepted {
        if self.is_completed(id) {
            return Accepted::AlreadyCompleted;
        }

        let group = self
            .pending
            .entry(id.clone())
            .or_insert_with(|| PendingGroup {
                text: String::new(),
                photos: Vec::new(),
                last_update: now,
                dispatch_started: false,
            });

        // Подпись в альбоме обычно у одной части, и не всегда у первой.
        if group.text.is_empty() && !text.is_empty() {
            group.text = text.to_owned();
        }

        if let Some(photo) = photo {
            if !group.photos.contains(&photo) {
                group.photos.push(photo);
                group.last_update = now;
            }
        }

        if group.dispatch_started {
            return Accepted::Buffered;
        }

        group.dispatch_started = true;

        Accepted::ScheduleDispatch
    }

    pub fn take_for_dispatch(&mut self, id: &MediaGroupId, now: Instant) -> Dispatch {
        let Some(group) = self.pending.get(id) else {
            return Dispatch::Missing;
        };

        if group.photos.is_empty() {
            return Dispatch::NoPhotos;
        }

        let Some(group) = self.pending.remove(id) else {
            return Dispatch::Missing;
        };

        self.completed.insert(id.clone(), now);

        Dispatch::Ready {
            text: group.text,
            photos: group.photos,
        }
    }

    /// Удаляет альбомы без обновлений дольше `staleness` и забывает
    /// завершённые альбомы старше `completed_ttl`.
    ///
    /// Возвращает идентификаторы удалённых незавершённых альбомов.
    pub fn sweep(
        &mut self,
        now: Instant,
        staleness: Duration,
        completed_ttl: Duration,
    ) -> Vec<MediaGroupId> {
        let stale = self
            .pending
            .iter()
            .filter(|(_, group)| now.duration_since(group.last_update) > staleness)
            .map(|(id, _)| id.clone())
            .collect::<Vec<_>>();

        for id in &stale {
            self.pending.remove(id);
        }

        self.completed
            .retain(|_, completed_at| now.duration_since(*completed_at) <= completed_ttl);

        stale
    }
}
