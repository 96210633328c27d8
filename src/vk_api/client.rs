use super::{Response, SavedPhoto, UploadServer, UploadedPhoto, WallPost};
use crate::{config, domain::VkGroupId};
use anyhow::{anyhow, Context};
use chrono::Utc;
use reqwest::{header::CONTENT_TYPE, multipart};
use serde::Serialize;
use std::path::PathBuf;
use tokio::fs;
use url::Url;

const VERSION: &str = "5.137";

/// Клиент для работы с API ВКонтакте.
pub struct Client {
    client: reqwest::Client,
    server: Url,
    token: String,
    language: String,
    debug: Option<ClientDebug>,
}

/// Параметры отладки клиента.
#[derive(Clone)]
pub struct ClientDebug {
    /// Флаг сохранения ответов в `responses_dir_path`.
    pub save_responses: bool,

    /// Путь до директории, куда будут сохраняться ответы от ВК,
    /// если установлен флаг `save_responses`.
    ///
    /// Формат имени файла: `vk-response-method-timestamp.json`.
    pub responses_dir_path: PathBuf,
}

impl From<&config::VkDebug> for ClientDebug {
    fn from(debug: &config::VkDebug) -> Self {
        Self {
            save_responses: debug.save_responses,
            responses_dir_path: debug.responses_dir_path.clone(),
        }
    }
}

#[derive(Serialize)]
struct MethodParams<'a, P> {
    #[serde(rename = "v")]
    pub api_version: &'a str,

    #[serde(rename = "lang")]
    pub language: &'a str,

    #[serde(flatten)]
    pub method_params: P,
}

impl Client {
    pub fn new(
        server: &Url,
        token: &str,
        language: &str,
        debug: Option<ClientDebug>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .build()
                .context("building http client")?,
            server: server.clone(),
            token: token.to_owned(),
            language: language.to_owned(),
            debug,
        })
    }

    /// Возвращает адрес сервера для загрузки фотографии на стену сообщества.
    pub async fn get_wall_upload_server(
        &self,
        group_id: VkGroupId,
    ) -> anyhow::Result<UploadServer> {
        #[derive(Serialize)]
        struct Params {
            group_id: u64,
        }

        self.call(
            "photos.getWallUploadServer",
            Params {
                group_id: group_id.0,
            },
        )
        .await
    }

    /// Загружает фотографию на сервер, полученный из [`Client::get_wall_upload_server`].
    pub async fn upload_wall_photo(
        &self,
        upload_url: &str,
        bytes: Vec<u8>,
    ) -> anyhow::Result<UploadedPhoto> {
        let part = multipart::Part::bytes(bytes)
            .file_name("photo.jpg")
            .mime_str("image/jpeg")
            .context("building photo part")?;

        let response = self
            .client
            .post(upload_url)
            .multipart(multipart::Form::new().part("photo", part))
            .send()
            .await
            .context("uploading photo")?;

        let response = response
            .text()
            .await
            .context("reading response from upload server")?;

        self.dump_response("upload", &response).await;

        serde_json::from_str::<UploadedPhoto>(&response)
            .with_context(|| format!("parsing response '{response}' from upload server"))
    }

    /// Сохраняет загруженную фотографию, чтобы её можно было прикрепить к записи.
    pub async fn save_wall_photo(
        &self,
        group_id: VkGroupId,
        uploaded: &UploadedPhoto,
    ) -> anyhow::Result<SavedPhoto> {
        #[derive(Serialize)]
        struct Params<'a> {
            group_id: u64,
            photo: &'a str,
            server: i64,
            hash: &'a str,
        }

        let photos: Vec<SavedPhoto> = self
            .call(
                "photos.saveWallPhoto",
                Params {
                    group_id: group_id.0,
                    photo: &uploaded.photo,
                    server: uploaded.server,
                    hash: &uploaded.hash,
                },
            )
            .await?;

        photos
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("photos.saveWallPhoto returned no photos"))
    }

    /// Публикует запись на стене сообщества от его имени.
    ///
    /// # Параметры
    ///
    /// * `group_id` - Идентификатор сообщества.
    /// * `message` - Текст записи.
    /// * `attachments` - Вложения в формате `photo{owner_id}_{id}`.
    pub async fn post_to_wall(
        &self,
        group_id: VkGroupId,
        message: &str,
        attachments: &[String],
    ) -> anyhow::Result<WallPost> {
        #[derive(Serialize)]
        struct Params<'a> {
            owner_id: i64,
            from_group: u8,
            message: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            attachments: Option<String>,
        }

        let attachments = (!attachments.is_empty()).then(|| attachments.join(","));

        self.call(
            "wall.post",
            Params {
                owner_id: group_id.as_owner_id(),
                from_group: 1,
                message,
                attachments,
            },
        )
        .await
    }

    async fn call<P, R>(&self, method: &str, params: P) -> anyhow::Result<R>
    where
        P: serde::Serialize,
        R: for<'a> serde::Deserialize<'a>,
    {
        let params = serde_urlencoded::to_string(MethodParams {
            api_version: VERSION,
            language: &self.language,
            method_params: params,
        })
        .with_context(|| format!("serializing params for method '{method}'"))?;

        let url = self
            .server
            .join(&format!("method/{method}"))
            .with_context(|| format!("building url for method '{method}'"))?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(params)
            .send()
            .await
            .with_context(|| format!("executing method '{method}'"))?;

        let response = response
            .text()
            .await
            .with_context(|| format!("reading response from method '{method}'"))?;

        self.dump_response(method, &response).await;

        serde_json::from_str::<Response<R>>(&response)
            .with_context(|| format!("parsing response '{response}' from method '{method}'"))?
            .into_result()
            .with_context(|| format!("executing method '{method}'"))
    }

    async fn dump_response(&self, method: &str, response: &str) {
        let Some(debug) = &self.debug else {
            return;
        };

        if !debug.save_responses {
            return;
        }

        let dump_path = debug.responses_dir_path.join(format!(
            "vk-response-{method}-{timestamp}.json",
            timestamp = Utc::now().timestamp_millis()
        ));

        match fs::write(&dump_path, response).await {
            Ok(()) => log::debug!(
                "Successfully save vk response into file '{path}'",
                path = dump_path.display(),
            ),
            Err(err) => log::error!(
                "Failed to save vk response into file '{path}': {err}",
                path = dump_path.display(),
                err = err,
            ),
        }
    }
}
