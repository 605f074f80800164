use std::sync::Arc;

use async_trait::async_trait;
use lettre::Message;
use tokio::sync::Mutex;

use super::Transport;
use crate::context::{self, AttributeBundle};
use crate::error::TransportError;

/// A message accepted by a [`MemoryTransport`].
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub message: Message,
    /// Attribute bundle visible to the task that performed the send.
    pub attributes: AttributeBundle,
    /// Name of the thread that performed the send.
    pub thread: Option<String>,
}

impl SentMessage {
    /// The message rendered as RFC 5322 text.
    pub fn formatted(&self) -> String {
        String::from_utf8_lossy(&self.message.formatted()).into_owned()
    }
}

/// In-process [`Transport`] for development and testing.
///
/// Messages are kept in a `Vec` behind a mutex instead of being delivered.
/// Clones share the same storage.
#[derive(Clone, Default)]
pub struct MemoryTransport {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    failure: Option<Arc<str>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that rejects every message with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            sent: Arc::default(),
            failure: Some(Arc::from(message)),
        }
    }

    /// Every message handed to this transport, including rejected ones.
    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, message: Message) -> Result<(), TransportError> {
        let record = SentMessage {
            message,
            attributes: context::current_attributes(),
            thread: std::thread::current().name().map(str::to_string),
        };
        self.sent.lock().await.push(record);

        match &self.failure {
            Some(reason) => Err(TransportError::Smtp(reason.to_string())),
            None => Ok(()),
        }
    }
}
