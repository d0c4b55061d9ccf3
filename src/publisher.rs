use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use teloxide::prelude::*;
use teloxide::types::{InputFile, Recipient};
use tracing::instrument;

use crate::ai::{ContentGenerator, ImageProvider, Orientation};
use crate::content::{Catalog, Topic, Track, UsageLedger};
use crate::error::{DeliveryError, PublishError};
use crate::prompts;

/// Where channel posts are delivered.
#[async_trait]
pub trait Channel: Send + Sync {
    async fn send_photo(&self, url: &str) -> Result<(), DeliveryError>;
    async fn send_message(&self, text: &str) -> Result<(), DeliveryError>;
}

pub struct TelegramChannel {
    bot: Bot,
    target: Recipient,
}

impl TelegramChannel {
    pub fn new(bot: Bot, target: Recipient) -> Self {
        Self { bot, target }
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    async fn send_photo(&self, url: &str) -> Result<(), DeliveryError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| DeliveryError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        self.bot
            .send_photo(self.target.clone(), InputFile::url(parsed))
            .await?;
        Ok(())
    }

    async fn send_message(&self, text: &str) -> Result<(), DeliveryError> {
        if text.trim().is_empty() {
            return Err(DeliveryError::Rejected("message text is empty".to_string()));
        }
        self.bot.send_message(self.target.clone(), text).await?;
        Ok(())
    }
}

/// Everything that went out in one successful cycle.
#[derive(Debug, Clone)]
pub struct PublishEvent {
    pub topic: Topic,
    pub text: String,
    pub image_url: String,
    pub track: Track,
}

/// Search terms for the photo attached to every post.
#[derive(Debug, Clone)]
pub struct ImageSearch {
    pub query: String,
    pub orientation: Orientation,
}

/// Runs publish cycles: select, generate, pick track, fetch image, deliver, commit.
pub struct Publisher {
    catalog: Arc<Catalog>,
    ledger: UsageLedger,
    generator: Arc<dyn ContentGenerator>,
    images: Arc<dyn ImageProvider>,
    image_search: ImageSearch,
    channel: Arc<dyn Channel>,
}

impl Publisher {
    pub fn new(
        catalog: Arc<Catalog>,
        ledger: UsageLedger,
        generator: Arc<dyn ContentGenerator>,
        images: Arc<dyn ImageProvider>,
        image_search: ImageSearch,
        channel: Arc<dyn Channel>,
    ) -> Self {
        Self {
            catalog,
            ledger,
            generator,
            images,
            image_search,
            channel,
        }
    }

    /// Run one publish cycle.
    ///
    /// Generation and image failures are replaced by fallback content. A
    /// delivery failure stops the remaining deliveries and leaves the topic
    /// unused, so it stays eligible for the next cycle.
    #[instrument(skip(self), fields(cycle = %uuid::Uuid::new_v4()))]
    pub async fn publish(&self) -> Result<PublishEvent, PublishError> {
        let selection = self.ledger.select(&self.catalog.topics).await?;
        let topic = selection.topic.clone();
        tracing::info!("🧠 Generating post on topic \"{}\"", topic);

        let text = match self.generator.generate(&prompts::channel_post(&topic)).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::warn!("Post generation failed, using fallback text: {}", e);
                prompts::POST_FALLBACK_TEXT.to_string()
            }
        };

        let track = self.pick_track().ok_or(PublishError::NoTracks)?;

        let image_url = match self
            .images
            .random_image(&self.image_search.query, self.image_search.orientation)
            .await
        {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Image lookup failed, using fallback image: {}", e);
                prompts::FALLBACK_IMAGE_URL.to_string()
            }
        };

        tracing::info!("📬 Sending to channel...");
        self.deliver(&text, &image_url, &track).await?;

        self.ledger
            .commit(selection)
            .await
            .map_err(PublishError::Ledger)?;
        tracing::info!("✅ Post published");

        Ok(PublishEvent {
            topic,
            text,
            image_url,
            track,
        })
    }

    fn pick_track(&self) -> Option<Track> {
        let mut rng = rand::thread_rng();
        self.catalog.tracks.choose(&mut rng).cloned()
    }

    async fn deliver(&self, text: &str, image_url: &str, track: &Track) -> Result<(), PublishError> {
        self.channel
            .send_photo(image_url)
            .await
            .map_err(delivery_failed("photo"))?;
        self.channel
            .send_message(text)
            .await
            .map_err(delivery_failed("post text"))?;
        self.channel
            .send_message(&prompts::track_announcement(track))
            .await
            .map_err(delivery_failed("track announcement"))?;
        Ok(())
    }
}

fn delivery_failed(step: &'static str) -> impl FnOnce(DeliveryError) -> PublishError {
    move |source| PublishError::Delivery { step, source }
}
