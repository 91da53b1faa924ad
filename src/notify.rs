//! Outbound notification payloads and the transport delivery seam
//!
//! The engine never talks to the transport directly; every operation returns
//! the notifications the transport should deliver once the engine call has
//! completed. `NotificationSink` is the async seam the transport implements.

use crate::error::Result;
use crate::types::ParticipantId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Interactive affordance attached to a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prompt {
    /// Render exactly three choices: rock, paper, scissors
    MoveSelection,
}

/// One outbound message for one recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: ParticipantId,
    pub text: String,
    pub prompt: Option<Prompt>,
}

impl Notification {
    pub fn text(recipient: impl Into<ParticipantId>, text: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            text: text.into(),
            prompt: None,
        }
    }

    pub fn with_move_prompt(recipient: impl Into<ParticipantId>, text: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            text: text.into(),
            prompt: Some(Prompt::MoveSelection),
        }
    }

    /// Serialize for the transport wire
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize from the transport wire
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Trait for delivering notifications to participants
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver a single notification to its recipient
    async fn deliver(&self, notification: Notification) -> Result<()>;
}

/// Deliver a batch, never letting one unreachable recipient block the rest
///
/// Delivery failures are logged and swallowed; an already-resolved round must
/// reach the other participant regardless.
pub async fn deliver_all(sink: &dyn NotificationSink, notifications: Vec<Notification>) {
    for notification in notifications {
        let recipient = notification.recipient.clone();
        if let Err(e) = sink.deliver(notification).await {
            warn!("Failed to deliver notification to {}: {}", recipient, e);
        }
    }
}

/// Recording sink for tests
#[derive(Debug, Default)]
pub struct RecordingSink {
    delivered: std::sync::Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications delivered so far (for testing)
    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }

    /// Notifications delivered to one recipient (for testing)
    pub fn delivered_to(&self, recipient: &str) -> Vec<Notification> {
        self.delivered()
            .into_iter()
            .filter(|n| n.recipient == recipient)
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut delivered) = self.delivered.lock() {
            delivered.clear();
        }
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, notification: Notification) -> Result<()> {
        if let Ok(mut delivered) = self.delivered.lock() {
            delivered.push(notification);
        }
        Ok(())
    }
}
