//! Fakes for the external collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ai::llm::GenerationRequest;
use crate::ai::{ContentGenerator, ImageProvider, Orientation};
use crate::error::{DeliveryError, GenerationError, ImageError};
use crate::publisher::Channel;

/// Returns the same text for every request, or fails every time.
pub struct ScriptedGenerator {
    reply: Option<String>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn ok(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Some(text) => Ok(text.clone()),
            None => Err(GenerationError::Api {
                status: 503,
                body: "model is loading".to_string(),
            }),
        }
    }
}

/// Returns the same URL for every lookup, or fails every time.
pub struct StaticImages {
    url: Option<String>,
    lookups: Mutex<Vec<(String, Orientation)>>,
}

impl StaticImages {
    pub fn ok(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            url: None,
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn lookups(&self) -> Vec<(String, Orientation)> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageProvider for StaticImages {
    async fn random_image(
        &self,
        query: &str,
        orientation: Orientation,
    ) -> Result<String, ImageError> {
        self.lookups
            .lock()
            .unwrap()
            .push((query.to_string(), orientation));
        self.url.clone().ok_or(ImageError::Api { status: 403 })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Photo(String),
    Message(String),
}

/// Records successful deliveries; optionally fails the n-th call (0-based).
pub struct RecordingChannel {
    fail_at: Option<usize>,
    calls: AtomicUsize,
    deliveries: Mutex<Vec<Delivery>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self {
            fail_at: None,
            calls: AtomicUsize::new(0),
            deliveries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_at(call: usize) -> Self {
        Self {
            fail_at: Some(call),
            ..Self::new()
        }
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }

    fn record(&self, delivery: Delivery) -> Result<(), DeliveryError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == Some(call) {
            return Err(DeliveryError::Rejected("chat not found".to_string()));
        }
        self.deliveries.lock().unwrap().push(delivery);
        Ok(())
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    async fn send_photo(&self, url: &str) -> Result<(), DeliveryError> {
        self.record(Delivery::Photo(url.to_string()))
    }

    async fn send_message(&self, text: &str) -> Result<(), DeliveryError> {
        self.record(Delivery::Message(text.to_string()))
    }
}
