//! Outbound record publishing.
//!
//! Decoded records leave the pipeline through a [`MessageBus`] seam. The
//! publisher owns a long-lived topic handle with create-if-absent
//! semantics: an existing topic counts as success. Records are serialized
//! to JSON and handed to the bus exactly once; transport failures are
//! logged and returned to the caller, never retried here.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::DecodedRecord;

/// Messaging-bus seam the publisher drives.
pub trait MessageBus {
    /// Create `topic`; returns [`BusError::AlreadyExists`] when present.
    fn create_topic(&mut self, topic: &str) -> Result<(), BusError>;
    /// Queue one message on `topic`.
    fn publish(&mut self, topic: &str, message: &[u8]) -> Result<(), BusError>;
}

#[derive(Debug, Error)]
pub enum BusError {
    #[error("topic {topic:?} already exists")]
    AlreadyExists { topic: String },
    #[error("topic {topic:?} not found")]
    TopicNotFound { topic: String },
    #[error("transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("bus error: {0}")]
    Bus(#[from] BusError),
}

/// Publishes decoded records on a fixed topic.
///
/// # Examples
/// ```
/// use thermolink_core::{DecodedRecord, MemoryBus, RecordPublisher};
///
/// let mut publisher = RecordPublisher::new(MemoryBus::new(), "timeseries");
/// publisher.publish_record(&DecodedRecord::AlarmEvent { active: true })?;
/// assert_eq!(publisher.bus().messages("timeseries").len(), 1);
/// # Ok::<(), thermolink_core::PublishError>(())
/// ```
pub struct RecordPublisher<B: MessageBus> {
    bus: B,
    topic: String,
    topic_ready: bool,
}

impl<B: MessageBus> RecordPublisher<B> {
    pub fn new(bus: B, topic: impl Into<String>) -> Self {
        Self {
            bus,
            topic: topic.into(),
            topic_ready: false,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Serialize `record` to JSON and queue it on the topic.
    pub fn publish_record(&mut self, record: &DecodedRecord) -> Result<(), PublishError> {
        self.ensure_topic()?;
        let message = serde_json::to_vec(record)?;
        if let Err(err) = self.bus.publish(&self.topic, &message) {
            warn!(topic = %self.topic, error = %err, "failed to queue record");
            return Err(err.into());
        }
        debug!(topic = %self.topic, bytes = message.len(), "record queued");
        Ok(())
    }

    fn ensure_topic(&mut self) -> Result<(), PublishError> {
        if self.topic_ready {
            return Ok(());
        }
        match self.bus.create_topic(&self.topic) {
            Ok(()) | Err(BusError::AlreadyExists { .. }) => {
                self.topic_ready = true;
                Ok(())
            }
            Err(err) => {
                warn!(topic = %self.topic, error = %err, "failed to get topic");
                Err(err.into())
            }
        }
    }
}

/// In-process bus backing tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryBus {
    topics: BTreeMap<String, Vec<Vec<u8>>>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages queued on `topic`, oldest first.
    pub fn messages(&self, topic: &str) -> &[Vec<u8>] {
        self.topics.get(topic).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl MessageBus for MemoryBus {
    fn create_topic(&mut self, topic: &str) -> Result<(), BusError> {
        if self.topics.contains_key(topic) {
            return Err(BusError::AlreadyExists {
                topic: topic.to_string(),
            });
        }
        self.topics.insert(topic.to_string(), Vec::new());
        Ok(())
    }

    fn publish(&mut self, topic: &str, message: &[u8]) -> Result<(), BusError> {
        match self.topics.get_mut(topic) {
            Some(queue) => {
                queue.push(message.to_vec());
                Ok(())
            }
            None => Err(BusError::TopicNotFound {
                topic: topic.to_string(),
            }),
        }
    }
}
