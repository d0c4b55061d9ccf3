//! Typed failures for the collaborators and the publish cycle.
//!
//! Generation and image failures are recovered by the caller with fallback
//! content; delivery failures end the current cycle; startup failures end the
//! process.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    #[error("topic store is empty")]
    EmptyTopicStore,
    #[error("usage ledger unavailable: {0}")]
    Ledger(anyhow::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("inference request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("inference API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("inference API returned no text")]
    EmptyResponse,
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("image API error ({status})")]
    Api { status: u16 },
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
    #[error("invalid photo url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("delivery rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("track list is empty")]
    NoTracks,
    #[error("store unavailable: {0}")]
    Store(#[from] anyhow::Error),
}

/// Why a publish cycle ended without committing its topic.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error(transparent)]
    Select(#[from] SelectError),
    #[error("track list is empty")]
    NoTracks,
    #[error("delivery of {step} failed: {source}")]
    Delivery {
        step: &'static str,
        source: DeliveryError,
    },
    #[error("usage ledger unavailable: {0}")]
    Ledger(anyhow::Error),
}
