//! Lead notification emails.

pub mod compose;
pub mod dead_letter;
pub mod delivery;
pub mod mailer;

pub use compose::{compose_auto_reply, compose_lead_notification, escape_html, ComposedEmail};
pub use dead_letter::{DeadLetter, DeadLetterSink, JsonlDeadLetterLog, MemoryDeadLetters, NewDeadLetter};
pub use delivery::{parse_recipients, DeliveryReport, Notifier, RedeliveryReport};
pub use mailer::{LogMailer, MailError, MailService, OutgoingEmail, SmtpMailer};
