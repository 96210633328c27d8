use crate::config_validators as validators;
use anyhow::Context;
use garde::Validate;
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use url::Url;

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct Config {
    #[garde(dive)]
    pub vk: Vk,

    #[garde(dive)]
    pub telegram: Telegram,

    #[garde(dive)]
    #[serde(default)]
    pub filter: Filter,

    #[garde(dive)]
    #[serde(default)]
    pub relay: Relay,
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct Vk {
    #[garde(custom(validators::is_base_url))]
    #[serde(default = "default_vk_server")]
    pub server: Url,

    #[garde(length(min = 1))]
    #[serde(default = "default_vk_language")]
    pub language: String,

    /// Токен сообщества, от имени которого публикуются записи.
    #[garde(length(min = 1))]
    #[serde(default)]
    pub group_token: String,

    /// Токен пользователя для загрузки фотографий на стену.
    #[garde(length(min = 1))]
    #[serde(default)]
    pub user_token: String,

    /// Идентификатор сообщества без минуса.
    #[garde(range(min = 1))]
    pub group_id: u64,

    #[garde(dive)]
    pub debug: Option<VkDebug>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct VkDebug {
    #[garde(skip)]
    pub save_responses: bool,

    #[garde(custom(validators::is_directory_and_exists))]
    pub responses_dir_path: PathBuf,
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct Telegram {
    #[garde(length(min = 1))]
    #[serde(default)]
    pub bot_token: String,

    /// Канал, посты из которого пересылаются. Остальные чаты игнорируются.
    #[garde(skip)]
    pub channel_id: i64,
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct Filter {
    /// Слова, при наличии которых пост не публикуется. Регистр не важен.
    #[garde(skip)]
    pub drop_words: Vec<String>,

    #[garde(dive)]
    pub replacements: Vec<Replacement>,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            drop_words: vec!["розыгрыш".to_owned()],
            replacements: vec![Replacement {
                from: "@freelogistics".to_owned(),
                to: "@freelogistics1".to_owned(),
            }],
        }
    }
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct Replacement {
    #[garde(length(min = 1))]
    pub from: String,

    #[garde(skip)]
    pub to: String,
}

/// Тайминги сборки альбомов. Все значения в секундах.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(default)]
pub struct Relay {
    #[garde(range(min = 1), custom(validators::is_shorter_than(&self.staleness_threshold_secs)))]
    pub quiescence_delay_secs: u64,

    #[garde(range(min = 1))]
    pub sweep_interval_secs: u64,

    #[garde(range(min = 1))]
    pub staleness_threshold_secs: u64,

    #[garde(range(min = 1))]
    pub completed_ttl_secs: u64,
}

impl Default for Relay {
    fn default() -> Self {
        Self {
            quiescence_delay_secs: 3,
            sweep_interval_secs: 60,
            staleness_threshold_secs: 300,
            completed_ttl_secs: 12 * 300,
        }
    }
}

impl Relay {
    pub fn quiescence_delay(&self) -> Duration {
        Duration::from_secs(self.quiescence_delay_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn staleness_threshold(&self) -> Duration {
        Duration::from_secs(self.staleness_threshold_secs)
    }

    pub fn completed_ttl(&self) -> Duration {
        Duration::from_secs(self.completed_ttl_secs)
    }
}

fn default_vk_server() -> Url {
    Url::parse("https://api.vk.com/").expect("url should be valid")
}

fn default_vk_language() -> String {
    "ru".to_owned()
}

impl Config {
    pub fn read_from<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
        let path = path.as_ref();

        let raw: String = fs::read_to_string(path)
            .with_context(|| format!("reading file from {}", path.display()))?;

        let mut config: Config = toml::from_str(&raw)
            .with_context(|| format!("deserializing file from {}", path.display()))?;

        config.apply_env(|name| env::var(name).ok());

        config.validate(&()).map_err(|errors| {
            anyhow::anyhow!(
                "invalid values in config '{path}':\n{errors}",
                path = path.display()
            )
        })?;

        Ok(config)
    }

    /// Секреты можно не хранить в файле, а передать через переменные окружения.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(token) = var("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = token;
        }

        if let Some(token) = var("VK_ACCESS_TOKEN") {
            self.vk.group_token = token;
        }

        if let Some(token) = var("VK_USER_TOKEN") {
            self.vk.user_token = token;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [vk]
        group_token = "group"
        user_token = "user"
        group_id = 229000111

        [telegram]
        bot_token = "123:abc"
        channel_id = -1001234567890
    "#;

    #[test]
    fn minimal_config_uses_defaults() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        config.validate(&()).unwrap();

        assert_eq!(config.vk.server.as_str(), "https://api.vk.com/");
        assert_eq!(config.vk.language, "ru");
        assert_eq!(config.relay.quiescence_delay(), Duration::from_secs(3));
        assert_eq!(config.relay.sweep_interval(), Duration::from_secs(60));
        assert_eq!(config.relay.staleness_threshold(), Duration::from_secs(300));
        assert_eq!(config.relay.completed_ttl(), Duration::from_secs(3600));
        assert_eq!(config.filter.drop_words, ["розыгрыш"]);
        assert_eq!(config.filter.replacements[0].to, "@freelogistics1");
    }

    #[test]
    fn quiescence_must_be_shorter_than_staleness() {
        let raw = format!(
            "{MINIMAL}\n[relay]\nquiescence_delay_secs = 600\nstaleness_threshold_secs = 300\n"
        );
        let config: Config = toml::from_str(&raw).unwrap();

        assert!(config.validate(&()).is_err());
    }

    #[test]
    fn env_overrides_tokens() {
        let raw = r#"
            [vk]
            group_id = 1

            [telegram]
            channel_id = -1
        "#;
        let mut config: Config = toml::from_str(raw).unwrap();
        assert!(config.validate(&()).is_err());

        config.apply_env(|name| Some(format!("{name}-value")));
        config.validate(&()).unwrap();

        assert_eq!(config.telegram.bot_token, "TELEGRAM_BOT_TOKEN-value");
        assert_eq!(config.vk.group_token, "VK_ACCESS_TOKEN-value");
        assert_eq!(config.vk.user_token, "VK_USER_TOKEN-value");
    }
}
