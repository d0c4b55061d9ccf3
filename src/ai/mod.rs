pub mod image;
pub mod llm;

use async_trait::async_trait;

use crate::error::{GenerationError, ImageError};
use llm::GenerationRequest;

/// Turns a chat-style prompt into text.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// Photo orientation hint for image lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
    Squarish,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape => "landscape",
            Self::Portrait => "portrait",
            Self::Squarish => "squarish",
        }
    }
}

impl std::str::FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "landscape" => Ok(Self::Landscape),
            "portrait" => Ok(Self::Portrait),
            "squarish" => Ok(Self::Squarish),
            other => Err(format!(
                "'{}' is not one of landscape, portrait, squarish",
                other
            )),
        }
    }
}

/// Turns a search query into a photo URL.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn random_image(
        &self,
        query: &str,
        orientation: Orientation,
    ) -> Result<String, ImageError>;
}
