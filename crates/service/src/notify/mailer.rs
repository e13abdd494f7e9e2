//! Outbound mail transport.

use async_trait::async_trait;
use configs::MailConfig;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(String),
    #[error("could not build message: {0}")]
    Build(String),
    #[error("smtp transport error: {0}")]
    Transport(String),
    #[error("could not render message: {0}")]
    Render(String),
}

impl From<askama::Error> for MailError {
    fn from(e: askama::Error) -> Self { Self::Render(e.to_string()) }
}

/// One HTML email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

/// Delivers through an SMTP relay with STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(cfg: &MailConfig) -> Result<Self, MailError> {
        let from: Mailbox = cfg.from_address.parse().map_err(|e: lettre::address::AddressError| MailError::Address(e.to_string()))?;
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(cfg.host.trim())
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(cfg.port);
        if !cfg.username.is_empty() {
            builder = builder.credentials(Credentials::new(cfg.username.clone(), cfg.password.clone()));
        }
        Ok(Self { transport: builder.build(), from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        let to: Mailbox = mail.to.parse().map_err(|e: lettre::address::AddressError| MailError::Address(e.to_string()))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(mail.subject)
            .header(ContentType::TEXT_HTML)
            .body(mail.html)
            .map_err(|e| MailError::Build(e.to_string()))?;
        self.transport.send(message).await.map_err(|e| MailError::Transport(e.to_string()))?;
        Ok(())
    }
}

/// Used when no relay is configured: accepts everything, sends nothing.
#[derive(Debug, Default)]
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        debug!(to = %mail.to, subject = %mail.subject, "mail disabled; dropping message");
        Ok(())
    }
}

/// In-memory mailer for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Records every message; sends to addresses marked as failing error out.
    #[derive(Default)]
    pub struct RecordingMailer {
        sent: Mutex<Vec<OutgoingMail>>,
        failing: Mutex<HashSet<String>>,
    }

    impl RecordingMailer {
        pub fn fail_for(self, address: &str) -> Self {
            self.failing.lock().unwrap().insert(address.to_string());
            self
        }

        pub fn sent(&self) -> Vec<OutgoingMail> { self.sent.lock().unwrap().clone() }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
            if self.failing.lock().unwrap().contains(&mail.to) {
                return Err(MailError::Transport(format!("relay refused {}", mail.to)));
            }
            self.sent.lock().unwrap().push(mail);
            Ok(())
        }
    }
}
