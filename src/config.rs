use std::path::PathBuf;
use std::time::Duration;

use teloxide::types::{ChatId, Recipient};

use crate::ai::Orientation;

pub const DEFAULT_MODEL: &str = "deepseek-ai/DeepSeek-V3-0324";
pub const DEFAULT_INFERENCE_URL: &str = "https://router.huggingface.co/v1/chat/completions";
pub const DEFAULT_IMAGE_QUERY: &str = "music hiphop rhythm beats";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram_bot_token: String,
    pub huggingface_api_key: String,
    pub unsplash_access_key: String,
    /// Target channel: numeric chat id or `@username`
    pub channel: Recipient,
    pub database_url: String,

    pub model_name: String,
    pub inference_url: String,
    pub image_query: String,
    pub image_orientation: Orientation,

    /// Static fallbacks used when the store holds no topics/tracks yet
    pub topics_path: PathBuf,
    pub tracks_path: PathBuf,

    pub post_interval: Duration,

    /// Comma-separated Telegram user IDs of admins
    pub admin_ids: Vec<i64>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingVar(key))
        };

        let admin_ids: Vec<i64> = lookup("ADMIN_IDS")
            .unwrap_or_default()
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();

        let minutes: u64 = match lookup("POST_INTERVAL_MINUTES") {
            Some(raw) => raw
                .trim()
                .parse()
                .ok()
                .filter(|m| *m > 0)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "POST_INTERVAL_MINUTES",
                        format!("'{}' is not a positive number of minutes", raw),
                    )
                })?,
            None => 360,
        };

        let image_orientation = match lookup("IMAGE_ORIENTATION") {
            Some(raw) => raw
                .parse()
                .map_err(|e| ConfigError::InvalidValue("IMAGE_ORIENTATION", e))?,
            None => Orientation::Landscape,
        };

        Ok(Self {
            telegram_bot_token: required("TELEGRAM_BOT_TOKEN")?,
            huggingface_api_key: required("HUGGINGFACE_API_KEY")?,
            unsplash_access_key: required("UNSPLASH_ACCESS_KEY")?,
            channel: parse_channel(&required("CHANNEL_ID")?),
            database_url: required("DATABASE_URL")?,
            model_name: lookup("MODEL_NAME").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            inference_url: lookup("INFERENCE_URL")
                .unwrap_or_else(|| DEFAULT_INFERENCE_URL.to_string()),
            image_query: lookup("IMAGE_QUERY").unwrap_or_else(|| DEFAULT_IMAGE_QUERY.to_string()),
            image_orientation,
            topics_path: lookup("TOPICS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/topics.json")),
            tracks_path: lookup("TRACKS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/tracks.json")),
            post_interval: Duration::from_secs(minutes * 60),
            admin_ids,
        })
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }
}

fn parse_channel(raw: &str) -> Recipient {
    let raw = raw.trim();
    match raw.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) => Recipient::ChannelUsername(raw.to_string()),
    }
}
