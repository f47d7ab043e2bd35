//! Synchronous outbound dispatch queue.
//!
//! Bulk sends (campaign fan-out) enqueue one [`OutboundMessage`] per
//! recipient and then drain the queue to completion through the configured
//! [`Messenger`]. Draining is deliberately synchronous: there is no hidden
//! background worker, and this type is the single seam where an asynchronous
//! job runner could be slotted in later.

use std::sync::Arc;

use crate::{Messenger, OutboundMessage};

// ---------------------------------------------------------------------------
// DrainSummary
// ---------------------------------------------------------------------------

/// Counters from draining the queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainSummary {
    /// Messages the collaborator acknowledged.
    pub dispatched: i64,
    /// Messages that failed delivery.
    pub failed: i64,
}

impl DrainSummary {
    /// Whether every queued message was acknowledged.
    pub fn fully_dispatched(&self) -> bool {
        self.failed == 0
    }
}

// ---------------------------------------------------------------------------
// OutboundQueue
// ---------------------------------------------------------------------------

/// A per-send queue of outbound jobs, drained synchronously.
pub struct OutboundQueue {
    messenger: Arc<dyn Messenger>,
    pending: Vec<OutboundMessage>,
}

impl OutboundQueue {
    /// Create an empty queue that drains through `messenger`.
    pub fn new(messenger: Arc<dyn Messenger>) -> Self {
        Self {
            messenger,
            pending: Vec::new(),
        }
    }

    /// Add one outbound job.
    pub fn enqueue(&mut self, message: OutboundMessage) {
        self.pending.push(message);
    }

    /// Number of jobs waiting to be dispatched.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Dispatch every queued job, one at a time, and return the counters.
    ///
    /// A failed delivery is recorded and does not stop the remaining jobs.
    pub async fn drain(&mut self) -> DrainSummary {
        let mut summary = DrainSummary::default();

        for message in self.pending.drain(..) {
            match self.messenger.send(&message).await {
                Ok(()) => summary.dispatched += 1,
                Err(e) => {
                    tracing::warn!(
                        recipient = %message.recipient,
                        channel = %message.channel,
                        error = %e,
                        "Outbound job failed"
                    );
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
