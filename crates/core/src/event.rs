//! Domain event system — how the agent reports progress without a global logger.
//!
//! The agent loop publishes an event whenever something observable happens.
//! The CLI subscribes to render progress and to write the transcript; tests
//! subscribe to assert on what the loop did.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::message::{Lifetime, Message, Role};

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A message was appended to the store
    MessageAppended {
        lifetime: Lifetime,
        role: Role,
        name: Option<String>,
        content: String,
        timestamp: DateTime<Utc>,
    },

    /// The wrap library index was loaded
    LibraryLoaded { count: usize, timestamp: DateTime<Utc> },

    /// A completion request is in flight
    CompletionRequested {
        messages: usize,
        timestamp: DateTime<Utc>,
    },

    /// The reasoning service answered
    CompletionReceived {
        model: String,
        tokens_used: Option<u32>,
        timestamp: DateTime<Utc>,
    },

    /// A function call was approved by autopilot instead of the operator
    FunctionAutoApproved {
        summary: String,
        remaining: u32,
        timestamp: DateTime<Utc>,
    },

    /// The operator declined a function call
    FunctionDeclined { name: String, timestamp: DateTime<Utc> },

    /// A function call ran
    FunctionExecuted {
        name: String,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// A wrap's schema was learned
    WrapLearned {
        name: String,
        description: String,
        repo: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// Autopilot was armed from the prompt
    AutopilotArmed { count: u32, timestamp: DateTime<Utc> },

    /// An error occurred
    ErrorOccurred {
        context: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent {
    pub fn message_appended(lifetime: Lifetime, message: &Message) -> Self {
        Self::MessageAppended {
            lifetime,
            role: message.role,
            name: message.name.clone(),
            content: message.content.clone(),
            timestamp: message.timestamp,
        }
    }
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
