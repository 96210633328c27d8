use crate::config;
use anyhow::Context;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::borrow::Cow;

/// Результат обработки текста перед публикацией.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filtered {
    Publish(String),
    Drop,
}

/// Фильтр текста постов: отбрасывает розыгрыши, заменяет упоминания
/// и разворачивает markdown ссылки.
#[derive(Clone, Debug)]
pub struct TextFilter {
    drop_regex: Option<Regex>,
    replacements: Vec<config::Replacement>,
}

impl TextFilter {
    pub fn new(config: &config::Filter) -> anyhow::Result<Self> {
        let words = config
            .drop_words
            .iter()
            .filter(|word| !word.is_empty())
            .map(|word| regex::escape(word))
            .collect::<Vec<_>>();

        let drop_regex = if words.is_empty() {
            None
        } else {
            let pattern = words.join("|");
            let regex = RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .with_context(|| format!("building drop regex '{pattern}'"))?;

            Some(regex)
        };

        Ok(Self {
            drop_regex,
            replacements: config.replacements.clone(),
        })
    }

    pub fn filter(&self, text: &str) -> Filtered {
        if text.is_empty() {
            return Filtered::Publish(String::new());
        }

        if let Some(regex) = &self.drop_regex {
            if regex.is_match(text) {
                return Filtered::Drop;
            }
        }

        let mut text = text.to_owned();
        for replacement in &self.replacements {
            text = replace_mention(&text, &replacement.from, &replacement.to);
        }

        Filtered::Publish(unwrap_links(&text).into_owned())
    }
}

/// Заменяет `from` на `to`, не трогая вхождения, которые уже равны `to`.
fn replace_mention(text: &str, from: &str, to: &str) -> String {
    if from.is_empty() {
        return text.to_owned();
    }

    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find(from) {
        result.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let matched = if to.len() > from.len() && rest.starts_with(to) {
            to.len()
        } else {
            from.len()
        };

        result.push_str(to);
        rest = &rest[matched..];
    }

    result.push_str(rest);
    result
}

fn unwrap_links(text: &str) -> Cow<str> {
    static LINKS_REGEX: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\[([^\]]+)\]\((https?://[^)]+)\)").unwrap());

    LINKS_REGEX.replace_all(text, "$2")
}
