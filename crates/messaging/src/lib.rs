//! Meridian outbound messaging.
//!
//! The engine delegates all customer-facing delivery (email, SMS, push) to a
//! messaging collaborator behind the [`Messenger`] trait:
//!
//! - [`SmtpMessenger`] — email via SMTP (lettre).
//! - [`WebhookMessenger`] — hands messages to an external delivery gateway
//!   over HTTP with exponential-backoff retry.
//! - [`MemoryMessenger`] — records messages in memory; the fallback when no
//!   transport is configured, and the double used by tests.
//! - [`OutboundQueue`] — the synchronous dispatch seam campaign fan-out goes
//!   through.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod memory;
pub mod queue;
pub mod smtp;
pub mod webhook;

pub use memory::MemoryMessenger;
pub use queue::{DrainSummary, OutboundQueue};
pub use smtp::{SmtpConfig, SmtpMessenger};
pub use webhook::WebhookMessenger;

// ---------------------------------------------------------------------------
// OutboundMessage
// ---------------------------------------------------------------------------

/// One unit of outbound delivery, addressed to a single recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Delivery channel: `"email"`, `"sms"`, or `"push"`.
    pub channel: String,
    /// Channel-specific address (email address, phone number, device token).
    pub recipient: String,
    /// Subject line, for channels that have one.
    pub subject: Option<String>,
    /// Message body.
    pub body: String,
}

// ---------------------------------------------------------------------------
// DeliveryError
// ---------------------------------------------------------------------------

/// Error type for delivery failures.
///
/// Transport-specific error types stay inside their modules; the trait
/// surface carries only what callers can act on.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The recipient address could not be parsed for the channel.
    #[error("invalid recipient address: {0}")]
    Address(String),

    /// The underlying transport failed (connection, authentication, timeout).
    #[error("delivery transport error: {0}")]
    Transport(String),

    /// The remote gateway returned a non-2xx status code.
    #[error("delivery gateway returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// Messenger
// ---------------------------------------------------------------------------

/// The outbound messaging collaborator.
///
/// Implementations must be safe to share via `Arc<dyn Messenger>` across
/// concurrent requests. Retry policy beyond a single send attempt belongs to
/// the implementation, not to callers.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Deliver one message. `Ok(())` means the collaborator acknowledged it.
    async fn send(&self, message: &OutboundMessage) -> Result<(), DeliveryError>;
}
