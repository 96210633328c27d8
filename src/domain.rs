use std::fmt::Display;
use tokio::time::Instant;
use url::Url;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TelegramChannelId(pub i64);

impl Display for TelegramChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = self.0.to_string();
        let normal_id = id.strip_prefix("-100").unwrap_or(&id);

        f.write_str("https://t.me/c/")?;
        f.write_str(normal_id)
    }
}

/// Идентификатор сообщества ВКонтакте, без минуса.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VkGroupId(pub u64);

impl VkGroupId {
    /// Идентификатор владельца стены сообщества в формате API: `-{id}`.
    pub fn as_owner_id(&self) -> i64 {
        -(self.0 as i64)
    }
}

impl Display for VkGroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "https://vk.com/club{}", self.0)
    }
}

/// Идентификатор медиагруппы (альбома) в Telegram.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MediaGroupId(pub String);

impl Display for MediaGroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Ссылка на фотографию внутри Telegram (`file_id`), ещё не превращённая в URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhotoRef(pub String);

/// Одно сообщение из канала.
#[derive(Clone, Debug)]
pub struct InboundPost {
    /// Идентификатор альбома, если сообщение является его частью.
    pub group_id: Option<MediaGroupId>,

    /// Текст или подпись сообщения. Может быть пустым.
    pub text: String,

    /// Самый большой размер фотографии, если она есть.
    pub photo: Option<PhotoRef>,

    pub received_at: Instant,
}

pub type PhotoUrl = Url;
