use crate::config::SmtpConfig;
use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const SENDER_NAME: &str = "Ario Studio";

/// A fully rendered message for a single recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("could not build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("smtp: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("mail service unavailable: {0}")]
    Unavailable(String),
}

impl MailError {
    /// Whether sending the same message again may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            // Connection and TLS failures are neither transient nor permanent SMTP replies
            MailError::Transport(e) => !e.is_permanent(),
            MailError::Unavailable(_) => true,
            MailError::Address(_) | MailError::Build(_) => false,
        }
    }
}

/// Something that can deliver an [`OutgoingEmail`].
#[async_trait]
pub trait MailService: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;

    /// Whether messages actually leave the process.
    fn delivers(&self) -> bool {
        true
    }
}

fn email_domain(email: &str) -> &str {
    email.split('@').nth(1).unwrap_or("invalid")
}

// ==================== SMTP ====================

/// Brevo (or any authenticated relay) over async SMTP.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Port 465 uses implicit TLS, anything else STARTTLS.
    pub fn new(smtp: &SmtpConfig, from: &str) -> Result<Self, MailError> {
        let from = Mailbox::new(Some(SENDER_NAME.to_string()), from.trim().parse()?);
        let credentials = Credentials::new(smtp.username.clone(), smtp.password.clone());

        let builder = if smtp.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)?
        };

        let transport = builder.port(smtp.port).credentials(credentials).build();

        Ok(Self { transport, from })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, MailError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(email.to.trim().parse()?)
            .subject(email.subject.as_str());

        if let Some(reply_to) = &email.reply_to {
            builder = builder.reply_to(reply_to.trim().parse()?);
        }

        Ok(builder.multipart(
            MultiPart::alternative()
                .singlepart(SinglePart::plain(email.text.clone()))
                .singlepart(SinglePart::html(email.html.clone())),
        )?)
    }
}

#[async_trait]
impl MailService for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let message = self.build_message(email)?;

        debug!(
            "Sending '{}' to {} via SMTP",
            email.subject,
            email_domain(&email.to)
        );
        self.transport.send(message).await?;

        Ok(())
    }
}

// ==================== Log-only ====================

/// Writes messages to the process log instead of sending them.
///
/// Selected when SMTP credentials are absent; every send succeeds.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl MailService for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        info!(
            to = %email.to,
            subject = %email.subject,
            reply_to = email.reply_to.as_deref().unwrap_or(""),
            "Mail not sent (SMTP not configured):\n{}",
            email.text
        );
        Ok(())
    }

    fn delivers(&self) -> bool {
        false
    }
}
