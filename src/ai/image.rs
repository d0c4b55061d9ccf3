use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{ImageProvider, Orientation};
use crate::config::AppConfig;
use crate::error::ImageError;

const UNSPLASH_RANDOM_URL: &str = "https://api.unsplash.com/photos/random";

#[derive(Debug, Deserialize)]
struct UnsplashPhoto {
    urls: UnsplashUrls,
}

#[derive(Debug, Deserialize)]
struct UnsplashUrls {
    regular: String,
}

/// Random photo from Unsplash.
pub struct UnsplashClient {
    client: Client,
    access_key: String,
}

impl UnsplashClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            access_key: config.unsplash_access_key.clone(),
        }
    }
}

#[async_trait]
impl ImageProvider for UnsplashClient {
    async fn random_image(
        &self,
        query: &str,
        orientation: Orientation,
    ) -> Result<String, ImageError> {
        let resp = self
            .client
            .get(UNSPLASH_RANDOM_URL)
            .query(&[("query", query), ("orientation", orientation.as_str())])
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ImageError::Api {
                status: resp.status().as_u16(),
            });
        }

        let photo: UnsplashPhoto = resp.json().await?;
        Ok(photo.urls.regular)
    }
}
