//! In-memory messenger.
//!
//! Records every message instead of delivering it. Used as the fallback when
//! no SMTP host or gateway URL is configured (messages are logged, not
//! dropped silently) and as the test double for engine and campaign tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::{DeliveryError, Messenger, OutboundMessage};

/// Records outbound messages in memory.
#[derive(Default)]
pub struct MemoryMessenger {
    sent: Mutex<Vec<OutboundMessage>>,
    failure: Mutex<Option<String>>,
}

impl MemoryMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every message sent so far.
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().expect("messenger lock poisoned").clone()
    }

    /// Number of messages sent so far.
    pub fn sent_count(&self) -> usize {
        self.sent.lock().expect("messenger lock poisoned").len()
    }

    /// Make every subsequent send fail with the given transport error.
    /// Pass `None` to restore normal behaviour.
    pub fn set_failure(&self, message: Option<&str>) {
        *self.failure.lock().expect("messenger lock poisoned") = message.map(String::from);
    }
}

#[async_trait]
impl Messenger for MemoryMessenger {
    async fn send(&self, message: &OutboundMessage) -> Result<(), DeliveryError> {
        if let Some(reason) = self.failure.lock().expect("messenger lock poisoned").clone() {
            return Err(DeliveryError::Transport(reason));
        }
        tracing::info!(
            channel = %message.channel,
            recipient = %message.recipient,
            "Recording outbound message (no delivery transport configured)"
        );
        self.sent
            .lock()
            .expect("messenger lock poisoned")
            .push(message.clone());
        Ok(())
    }
}
