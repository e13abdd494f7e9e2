//! Notification dispatch for new bookings and contact requests.
//!
//! Each event produces two emails: an acknowledgement to the customer and an
//! alert to the office. They are sent concurrently and independently; a
//! failure is logged and counted but never reaches the caller, whose record
//! is already stored.

pub mod mailer;
pub mod templates;

use std::sync::Arc;

use common::metrics::{MAIL_FAILURES_TOTAL, MAIL_SENT_TOTAL};
use configs::MailConfig;
use models::{booking, contact};
use tracing::{info, warn};

pub use mailer::{MailError, Mailer, NoopMailer, OutgoingMail, SmtpMailer};

/// Outcome of one dispatch, mostly for tests and logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    admin_address: String,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, admin_address: impl Into<String>) -> Self {
        Self { mailer, admin_address: admin_address.into() }
    }

    /// SMTP when the `[mail]` section is complete, a no-op mailer otherwise.
    pub fn from_config(cfg: &MailConfig) -> Result<Self, MailError> {
        if !cfg.is_active() {
            warn!("mail relay not configured; notifications disabled");
            return Ok(Self::new(Arc::new(NoopMailer), cfg.admin_address.clone()));
        }
        let smtp = SmtpMailer::from_config(cfg)?;
        info!(host = %cfg.host, port = cfg.port, "smtp notifications enabled");
        Ok(Self::new(Arc::new(smtp), cfg.admin_address.clone()))
    }

    pub async fn booking_created(&self, b: &booking::Model) -> DispatchReport {
        let customer = templates::booking_acknowledgement(b);
        let office = templates::booking_alert(b, &self.admin_address);
        self.dispatch("booking", &b.booking_id, customer, office).await
    }

    pub async fn contact_created(&self, c: &contact::Model) -> DispatchReport {
        let customer = templates::contact_acknowledgement(c);
        let office = templates::contact_alert(c, &self.admin_address);
        self.dispatch("contact", &c.id.to_string(), customer, office).await
    }

    async fn dispatch(
        &self,
        kind: &str,
        reference: &str,
        customer: Result<OutgoingMail, MailError>,
        office: Result<OutgoingMail, MailError>,
    ) -> DispatchReport {
        let (a, b) = tokio::join!(self.deliver(kind, reference, customer), self.deliver(kind, reference, office));
        let sent = usize::from(a) + usize::from(b);
        DispatchReport { sent, failed: 2 - sent }
    }

    async fn deliver(&self, kind: &str, reference: &str, mail: Result<OutgoingMail, MailError>) -> bool {
        let mail = match mail {
            Ok(mail) => mail,
            Err(e) => {
                MAIL_FAILURES_TOTAL.inc();
                warn!(kind, reference, err = %e, "notification not rendered");
                return false;
            }
        };
        let to = mail.to.clone();
        if to.trim().is_empty() {
            warn!(kind, reference, "no recipient; notification skipped");
            MAIL_FAILURES_TOTAL.inc();
            return false;
        }
        match self.mailer.send(mail).await {
            Ok(()) => {
                MAIL_SENT_TOTAL.inc();
                true
            }
            Err(e) => {
                MAIL_FAILURES_TOTAL.inc();
                warn!(kind, reference, to = %to, err = %e, "notification failed");
                false
            }
        }
    }
}
