//! Email delivery via SMTP.
//!
//! [`SmtpMessenger`] wraps the `lettre` async SMTP transport to send
//! plain-text messages. Configuration is loaded from environment variables;
//! if `SMTP_HOST` is not set, [`SmtpConfig::from_env`] returns `None` and no
//! mailer should be constructed.

use async_trait::async_trait;

use crate::{DeliveryError, Messenger, OutboundMessage};

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@meridian.local";

// ---------------------------------------------------------------------------
// SmtpConfig
// ---------------------------------------------------------------------------

/// Configuration for the SMTP email delivery service.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl SmtpConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured and should be skipped.
    ///
    /// | Variable        | Required | Default                   |
    /// |-----------------|----------|---------------------------|
    /// | `SMTP_HOST`     | yes      | —                         |
    /// | `SMTP_PORT`     | no       | `587`                     |
    /// | `SMTP_FROM`     | no       | `noreply@meridian.local`  |
    /// | `SMTP_USER`     | no       | —                         |
    /// | `SMTP_PASSWORD` | no       | —                         |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// SmtpMessenger
// ---------------------------------------------------------------------------

/// Sends outbound messages as plain-text email via SMTP.
pub struct SmtpMessenger {
    config: SmtpConfig,
}

impl SmtpMessenger {
    /// Create a new SMTP messenger with the given configuration.
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Messenger for SmtpMessenger {
    async fn send(&self, message: &OutboundMessage) -> Result<(), DeliveryError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let subject = message
            .subject
            .clone()
            .unwrap_or_else(|| "A message from Meridian".to_string());

        let email = Message::builder()
            .from(
                self.config
                    .from_address
                    .parse()
                    .map_err(|e| DeliveryError::Address(format!("{e}")))?,
            )
            .to(message
                .recipient
                .parse()
                .map_err(|e| DeliveryError::Address(format!("{e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
                .map_err(|e| DeliveryError::Transport(e.to_string()))?
                .port(self.config.smtp_port);

        if let (Some(user), Some(password)) = (
            self.config.smtp_user.clone(),
            self.config.smtp_password.clone(),
        ) {
            builder = builder.credentials(Credentials::new(user, password));
        }

        let transport = builder.build();
        transport
            .send(email)
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        tracing::debug!(recipient = %message.recipient, "Email dispatched via SMTP");
        Ok(())
    }
}
