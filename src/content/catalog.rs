use std::path::Path;

use serde::de::DeserializeOwned;

use super::{Topic, Track};
use crate::db::{self, keys, KvStore};
use crate::error::StartupError;

/// Topics and tracks, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub topics: Vec<Topic>,
    pub tracks: Vec<Track>,
}

impl Catalog {
    /// Load topics and tracks from the store, falling back to the bundled
    /// JSON files, and write the result back so later starts use the store.
    pub async fn load(
        store: &dyn KvStore,
        topics_path: &Path,
        tracks_path: &Path,
    ) -> Result<Self, StartupError> {
        let topics: Vec<Topic> = load_or_read(store, keys::TOPICS, topics_path).await?;
        let tracks: Vec<Track> = load_or_read(store, keys::TRACKS, tracks_path).await?;

        if tracks.is_empty() {
            return Err(StartupError::NoTracks);
        }
        if topics.is_empty() {
            tracing::warn!("Topic list is empty; every publish cycle will be skipped");
        }

        db::save(store, keys::TRACKS, &tracks).await?;
        db::save(store, keys::TOPICS, &topics).await?;

        tracing::info!("Catalog loaded: {} topics, {} tracks", topics.len(), tracks.len());
        Ok(Self { topics, tracks })
    }
}

async fn load_or_read<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &'static str,
    path: &Path,
) -> Result<T, StartupError> {
    match db::load::<T>(store, key).await {
        Ok(Some(value)) => return Ok(value),
        Ok(None) => {}
        Err(e) => {
            tracing::warn!("Stored '{}' unreadable, using {}: {}", key, path.display(), e);
        }
    }

    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StartupError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&raw).map_err(|source| StartupError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
