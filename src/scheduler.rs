use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::publisher::Publisher;

/// Control messages for the posting loop.
#[derive(Debug)]
pub enum PostingMessage {
    /// Publish now, outside the regular interval
    PostNext,
    Shutdown,
}

/// Publishes on a fixed interval and on request.
pub struct PostingScheduler {
    publisher: Arc<Publisher>,
    period: Duration,
    rx: mpsc::Receiver<PostingMessage>,
}

impl PostingScheduler {
    pub fn new(publisher: Arc<Publisher>, period: Duration) -> (Self, mpsc::Sender<PostingMessage>) {
        let (tx, rx) = mpsc::channel(8);
        (
            Self {
                publisher,
                period,
                rx,
            },
            tx,
        )
    }

    /// Runs until `Shutdown` arrives or every sender is dropped. The first
    /// scheduled post happens one full period after start.
    pub async fn run(mut self) {
        tracing::info!("⏰ Posting every {} min", self.period.as_secs() / 60);

        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.run_cycle().await,
                msg = self.rx.recv() => match msg {
                    Some(PostingMessage::PostNext) => {
                        tracing::info!("Immediate post requested");
                        self.run_cycle().await;
                    }
                    Some(PostingMessage::Shutdown) | None => {
                        tracing::info!("Posting scheduler shutting down");
                        break;
                    }
                },
            }
        }
    }

    async fn run_cycle(&self) {
        match self.publisher.publish().await {
            Ok(event) => tracing::info!(
                topic = %event.topic,
                track = %event.track.title,
                image = %event.image_url,
                chars = event.text.chars().count(),
                "Publish cycle complete"
            ),
            Err(e) => tracing::error!("❌ Publish cycle failed: {}", e),
        }
    }
}
