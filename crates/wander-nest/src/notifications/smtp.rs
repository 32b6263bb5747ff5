use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::runtime::Handle;
use tracing::{info, warn};

use super::{MailError, Mailer, OutboundEmail};
use crate::config::MailConfig;

/// SMTP delivery over STARTTLS using the configured relay and credentials.
///
/// `send` only validates and queues the message; the SMTP conversation runs on
/// the tokio runtime the mailer was built in, bounded by the configured timeout.
/// Delivery failures are logged, never returned.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    runtime: Handle,
}

impl SmtpMailer {
    /// Must be called from within a tokio runtime.
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let from = parse_mailbox(&config.from)?;
        let runtime = Handle::try_current().map_err(|err| {
            MailError::Transport(format!("smtp delivery needs a tokio runtime: {err}"))
        })?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|err| MailError::Transport(err.to_string()))?
            .port(config.port)
            .timeout(Some(Duration::from_secs(config.timeout_secs)));

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
            runtime,
        })
    }

    fn build_message(&self, email: OutboundEmail) -> Result<Message, MailError> {
        let to = parse_mailbox(&email.to)?;
        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html)
            .map_err(|err| MailError::Build(err.to_string()))
    }
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        let to = email.to.clone();
        let subject = email.subject.clone();
        let message = self.build_message(email)?;
        let transport = self.transport.clone();

        self.runtime.spawn(async move {
            match transport.send(message).await {
                Ok(_) => info!(to = %to, subject = %subject, "email delivered"),
                Err(err) => warn!(
                    error = %err,
                    to = %to,
                    subject = %subject,
                    "smtp delivery failed"
                ),
            }
        });
        Ok(())
    }
}

/// Writes emails to the log instead of delivering them. Used when no SMTP
/// credentials are configured.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        info!(
            to = %email.to,
            subject = %email.subject,
            bytes = email.html.len(),
            "smtp disabled, email logged instead of delivered"
        );
        Ok(())
    }
}

fn parse_mailbox(raw: &str) -> Result<Mailbox, MailError> {
    raw.parse::<Mailbox>()
        .map_err(|err| MailError::InvalidAddress {
            address: raw.to_string(),
            reason: err.to_string(),
        })
}
