use serde::Deserialize;

/// Ответ `photos.getWallUploadServer`.
#[derive(Clone, Debug, Deserialize)]
pub struct UploadServer {
    pub upload_url: String,
}

/// Ответ сервера загрузки. Передаётся в `photos.saveWallPhoto` как есть.
#[derive(Clone, Debug, Deserialize)]
pub struct UploadedPhoto {
    pub server: i64,
    pub photo: String,
    pub hash: String,
}

/// Фотография, сохранённая на стене, из ответа `photos.saveWallPhoto`.
#[derive(Clone, Debug, Deserialize)]
pub struct SavedPhoto {
    pub id: i64,
    pub owner_id: i64,
}

impl SavedPhoto {
    /// Вложение для `wall.post` в формате `photo{owner_id}_{id}`.
    pub fn attachment(&self) -> String {
        format!("photo{}_{}", self.owner_id, self.id)
    }
}

/// Ответ `wall.post`.
#[derive(Clone, Debug, Deserialize)]
pub struct WallPost {
    pub post_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uploaded_photo_keeps_raw_photo_field() {
        let raw = r#"{"server": 851234, "photo": "[{\"markers_restarted\":true}]", "hash": "5e3c"}"#;
        let uploaded = serde_json::from_str::<UploadedPhoto>(raw).unwrap();

        assert_eq!(uploaded.server, 851234);
        assert_eq!(uploaded.photo, r#"[{"markers_restarted":true}]"#);
    }

    #[test]
    fn saved_photo_attachment() {
        let raw = r#"[{"id": 457239017, "owner_id": -229000111, "album_id": -14}]"#;
        let saved = serde_json::from_str::<Vec<SavedPhoto>>(raw).unwrap();

        assert_eq!(saved[0].attachment(), "photo-229000111_457239017");
    }
}
