use serde::Deserialize;
use std::fmt::{self, Display};

/// Ответ метода API: либо `response`, либо `error`.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum Response<T> {
    Ok { response: T },
    Err { error: ApiError },
}

impl<T> Response<T> {
    pub fn into_result(self) -> Result<T, ApiError> {
        match self {
            Response::Ok { response } => Ok(response),
            Response::Err { error } => Err(error),
        }
    }
}

/// Ошибка, которую вернул ВКонтакте, см. [https://dev.vk.com/ru/reference/errors].
#[derive(Clone, Debug, Deserialize)]
pub struct ApiError {
    pub error_code: i64,
    pub error_msg: String,
}

impl Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vk error {}: {}", self.error_code, self.error_msg)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vk_api::WallPost;

    #[test]
    fn parses_success() {
        let raw = r#"{"response": {"post_id": 42}}"#;
        let response = serde_json::from_str::<Response<WallPost>>(raw).unwrap();

        assert_eq!(response.into_result().unwrap().post_id, 42);
    }

    #[test]
    fn parses_error() {
        let raw = r#"{"error": {"error_code": 214, "error_msg": "Access to adding post denied", "request_params": []}}"#;
        let error = serde_json::from_str::<Response<WallPost>>(raw)
            .unwrap()
            .into_result()
            .unwrap_err();

        assert_eq!(error.error_code, 214);
        assert_eq!(error.to_string(), "vk error 214: Access to adding post denied");
    }
}
