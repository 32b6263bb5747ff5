//! Outbound email used by the safety workflow to reach the admin team.
//!
//! Workflows depend only on the [`Mailer`] trait; the server picks an SMTP or
//! tracing-backed implementation at startup based on the configured credentials.

pub mod smtp;
pub mod templates;

use serde::Serialize;

pub use smtp::{LogMailer, SmtpMailer};
pub use templates::{admin_alert_email, AdminAlert, AlertUrgency};

/// A rendered transactional email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Notification gateway. Callers treat delivery as best-effort, and
/// implementations return without waiting on a remote server.
pub trait Mailer: Send + Sync {
    fn send(&self, email: OutboundEmail) -> Result<(), MailError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid mailbox '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error("unable to build message: {0}")]
    Build(String),
    #[error("mail transport unavailable: {0}")]
    Transport(String),
}
