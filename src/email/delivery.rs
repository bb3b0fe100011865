use super::compose::{compose_auto_reply, compose_lead_notification, ComposedEmail};
use super::dead_letter::{DeadLetterSink, NewDeadLetter};
use super::mailer::{LogMailer, MailError, MailService, OutgoingEmail, SmtpMailer};
use crate::config::Config;
use crate::form::is_valid_email;
use crate::i18n::Language;
use crate::lead::Lead;
use crate::retry::{with_retry_if, RetryConfig};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const KIND_LEAD_NOTIFICATION: &str = "lead_notification";
const KIND_AUTO_REPLY: &str = "auto_reply";

/// Split a comma-separated address list, dropping anything that is not a
/// valid address. Order is kept and duplicates are removed.
pub fn parse_recipients(list: &str) -> Vec<String> {
    let mut recipients: Vec<String> = Vec::new();
    for candidate in list.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        if !is_valid_email(candidate) {
            debug!("Ignoring invalid recipient address");
            continue;
        }
        if !recipients.iter().any(|r| r.eq_ignore_ascii_case(candidate)) {
            recipients.push(candidate.to_string());
        }
    }
    recipients
}

/// Counts of what happened to the messages of one notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub sent: usize,
    /// Exhausted retries and recorded for redelivery
    pub dead_lettered: usize,
    /// Failed and could not be recorded either
    pub lost: usize,
}

impl DeliveryReport {
    fn merge(self, other: Self) -> Self {
        Self {
            sent: self.sent + other.sent,
            dead_lettered: self.dead_lettered + other.dead_lettered,
            lost: self.lost + other.lost,
        }
    }

    pub fn failed(&self) -> usize {
        self.dead_lettered + self.lost
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RedeliveryReport {
    pub attempted: usize,
    pub resolved: usize,
    pub still_failing: usize,
    /// Permanently rejected letters left for an operator
    pub skipped: usize,
    /// Outcomes the dead-letter sink failed to store
    pub unrecorded: usize,
}

/// Sends lead notifications and auto-replies.
///
/// Delivery never fails the caller: a message that cannot be sent after
/// retrying is written to the dead-letter sink.
pub struct Notifier {
    mailer: Arc<dyn MailService>,
    recipients: Vec<String>,
    dead_letters: Arc<dyn DeadLetterSink>,
    send_retry: RetryConfig,
    redelivery_retry: RetryConfig,
}

impl Notifier {
    pub fn new(
        mailer: Arc<dyn MailService>,
        recipients: Vec<String>,
        dead_letters: Arc<dyn DeadLetterSink>,
    ) -> Self {
        Self {
            mailer,
            recipients,
            dead_letters,
            send_retry: RetryConfig::smtp_send(),
            redelivery_retry: RetryConfig::redelivery(),
        }
    }

    /// Override both retry policies.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.send_retry = retry.clone();
        self.redelivery_retry = retry;
        self
    }

    /// SMTP when credentials and a sender are configured, log-only otherwise.
    pub fn from_config(config: &Config, dead_letters: Arc<dyn DeadLetterSink>) -> Self {
        let recipients = config
            .mail_to
            .as_deref()
            .map(parse_recipients)
            .unwrap_or_default();

        let mailer: Arc<dyn MailService> = match (&config.smtp, &config.mail_from) {
            (Some(smtp), Some(from)) => match SmtpMailer::new(smtp, from) {
                Ok(mailer) => {
                    info!("✓ SMTP delivery via {}:{}", smtp.host, smtp.port);
                    Arc::new(mailer)
                }
                Err(e) => {
                    warn!("SMTP configuration rejected ({}), mail will only be logged", e);
                    Arc::new(LogMailer)
                }
            },
            (Some(_), None) => {
                warn!("SMTP configured without CONTACT_FROM_EMAIL or ADMIN_EMAIL, mail will only be logged");
                Arc::new(LogMailer)
            }
            (None, _) => {
                info!("SMTP not configured, mail will only be logged");
                Arc::new(LogMailer)
            }
        };

        if recipients.is_empty() {
            warn!("No valid CONTACT_TO_EMAIL or ADMIN_EMAIL, lead notifications have no recipients");
        }

        Self::new(mailer, recipients, dead_letters)
    }

    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    pub fn delivers(&self) -> bool {
        self.mailer.delivers()
    }

    /// Send to the studio and confirm to the submitter, concurrently.
    pub async fn notify(&self, lead: &Lead) -> DeliveryReport {
        let (admin, reply) = tokio::join!(
            self.send_lead_notification(lead, lead.locale),
            self.send_auto_reply(&lead.name, &lead.email, lead.locale),
        );
        let report = admin.merge(reply);

        if report.failed() == 0 {
            info!("Notifications for {} lead: {} sent", lead.kind.as_str(), report.sent);
        } else {
            warn!(
                "Notifications for {} lead: {} sent, {} dead-lettered, {} lost",
                lead.kind.as_str(),
                report.sent,
                report.dead_lettered,
                report.lost
            );
        }

        report
    }

    /// Fan the admin notification out to every recipient.
    pub async fn send_lead_notification(&self, lead: &Lead, lang: Language) -> DeliveryReport {
        if self.recipients.is_empty() {
            warn!("Lead notification skipped: no recipients configured");
            return DeliveryReport::default();
        }

        let composed = compose_lead_notification(lead, lang);
        let sends = self.recipients.iter().map(|to| {
            let email = outgoing(to, &composed, Some(lead.email.clone()));
            async move { self.deliver(KIND_LEAD_NOTIFICATION, email).await }
        });

        join_all(sends)
            .await
            .into_iter()
            .fold(DeliveryReport::default(), DeliveryReport::merge)
    }

    pub async fn send_auto_reply(&self, name: &str, email: &str, lang: Language) -> DeliveryReport {
        let composed = compose_auto_reply(name, lang);
        self.deliver(KIND_AUTO_REPLY, outgoing(email, &composed, None))
            .await
    }

    async fn deliver(&self, kind: &str, email: OutgoingEmail) -> DeliveryReport {
        let operation = format!("Send {}", kind);
        let result = with_retry_if(
            &self.send_retry,
            &operation,
            || self.mailer.send(&email),
            MailError::is_transient,
        )
        .await;

        let error = match result {
            Ok(()) => {
                return DeliveryReport {
                    sent: 1,
                    ..Default::default()
                }
            }
            Err(e) => e,
        };

        let attempts = if error.is_transient() {
            self.send_retry.max_attempts.max(1) as i32
        } else {
            1
        };

        error!("{} failed, recording for redelivery: {}", operation, error);
        let letter = NewDeadLetter {
            kind: kind.to_string(),
            email,
            last_error: error.to_string(),
            attempts,
            permanent: !error.is_transient(),
        };

        match self.dead_letters.record(letter).await {
            Ok(id) => {
                debug!("Dead letter {} recorded", id);
                DeliveryReport {
                    dead_lettered: 1,
                    ..Default::default()
                }
            }
            Err(e) => {
                error!("Could not record dead letter, notification lost: {:#}", e);
                DeliveryReport {
                    lost: 1,
                    ..Default::default()
                }
            }
        }
    }

    /// Resend every pending dead letter once (with a short retry).
    ///
    /// Letters whose last failure was permanent are left alone. A sink error
    /// on one letter is logged and the batch continues.
    pub async fn redeliver_dead_letters(&self) -> anyhow::Result<RedeliveryReport> {
        let pending = self.dead_letters.pending().await?;
        let mut report = RedeliveryReport::default();

        if pending.is_empty() {
            return Ok(report);
        }

        if !self.mailer.delivers() {
            info!(
                "{} dead letter(s) pending, skipping redelivery: SMTP not configured",
                pending.len()
            );
            return Ok(report);
        }

        let (permanent, retryable): (Vec<_>, Vec<_>) =
            pending.into_iter().partition(|letter| letter.permanent);
        report.skipped = permanent.len();
        if report.skipped > 0 {
            debug!("Skipping {} permanently rejected dead letter(s)", report.skipped);
        }

        info!("Redelivering {} dead letter(s)", retryable.len());

        for letter in retryable {
            report.attempted += 1;
            let operation = format!("Redeliver {} #{}", letter.kind, letter.id);

            let result = with_retry_if(
                &self.redelivery_retry,
                &operation,
                || self.mailer.send(&letter.email),
                MailError::is_transient,
            )
            .await;

            let stored = match result {
                Ok(()) => {
                    report.resolved += 1;
                    self.dead_letters.mark_resolved(letter.id).await
                }
                Err(e) => {
                    warn!("{} failed again: {}", operation, e);
                    report.still_failing += 1;
                    self.dead_letters
                        .record_attempt(letter.id, &e.to_string(), !e.is_transient())
                        .await
                }
            };

            if let Err(e) = stored {
                error!("{}: could not update dead letter: {:#}", operation, e);
                report.unrecorded += 1;
            }
        }

        info!(
            "Redelivery finished: {} resolved, {} still failing, {} skipped, {} unrecorded",
            report.resolved, report.still_failing, report.skipped, report.unrecorded
        );

        Ok(report)
    }
}

fn outgoing(to: &str, composed: &ComposedEmail, reply_to: Option<String>) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        subject: composed.subject.clone(),
        html: composed.html.clone(),
        text: composed.text.clone(),
        reply_to,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SmtpConfig;
    use crate::email::dead_letter::{DeadLetter, MemoryDeadLetters};
    use crate::lead::{LeadKind, LeadSubmission};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // ==================== Helpers ====================

    /// Fails the first `n` sends to an address, then succeeds.
    #[derive(Default)]
    struct ScriptedMailer {
        failures: Mutex<HashMap<String, usize>>,
        permanent: bool,
        sent: Mutex<Vec<OutgoingEmail>>,
        attempts: Mutex<usize>,
    }

    impl ScriptedMailer {
        fn failing(to: &str, times: usize) -> Self {
            let mailer = Self::default();
            mailer.failures.lock().unwrap().insert(to.to_string(), times);
            mailer
        }

        fn sent_to(&self) -> Vec<String> {
            let mut to: Vec<_> = self.sent.lock().unwrap().iter().map(|e| e.to.clone()).collect();
            to.sort();
            to
        }
    }

    #[async_trait]
    impl MailService for ScriptedMailer {
        async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
            *self.attempts.lock().unwrap() += 1;
            {
                let mut failures = self.failures.lock().unwrap();
                if let Some(remaining) = failures.get_mut(&email.to) {
                    if *remaining > 0 {
                        *remaining -= 1;
                        if self.permanent {
                            return Err(MailError::Address(
                                "bad".parse::<lettre::Address>().unwrap_err(),
                            ));
                        }
                        return Err(MailError::Unavailable("relay down".to_string()));
                    }
                }
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    fn lead() -> Lead {
        LeadSubmission {
            name: Some("Jane".to_string()),
            email: Some("jane@x.com".to_string()),
            project_type: Some("landing-page".to_string()),
            budget: Some("1000-2000".to_string()),
            ..Default::default()
        }
        .validate(LeadKind::ProjectRequest, Language::ENGLISH)
        .unwrap()
    }

    /// Memory sink whose first `mark_resolved` fails.
    #[derive(Default)]
    struct FlakySink {
        inner: MemoryDeadLetters,
        resolve_failed: Mutex<bool>,
    }

    #[async_trait]
    impl DeadLetterSink for FlakySink {
        async fn record(&self, letter: NewDeadLetter) -> anyhow::Result<i64> {
            self.inner.record(letter).await
        }

        async fn pending(&self) -> anyhow::Result<Vec<DeadLetter>> {
            self.inner.pending().await
        }

        async fn mark_resolved(&self, id: i64) -> anyhow::Result<()> {
            {
                let mut failed = self.resolve_failed.lock().unwrap();
                if !*failed {
                    *failed = true;
                    anyhow::bail!("disk full");
                }
            }
            self.inner.mark_resolved(id).await
        }

        async fn record_attempt(&self, id: i64, error: &str, permanent: bool) -> anyhow::Result<()> {
            self.inner.record_attempt(id, error, permanent).await
        }
    }

    fn dead_letter(to: &str, permanent: bool) -> NewDeadLetter {
        NewDeadLetter {
            kind: KIND_AUTO_REPLY.to_string(),
            email: OutgoingEmail {
                to: to.to_string(),
                subject: "s".to_string(),
                html: "h".to_string(),
                text: "t".to_string(),
                reply_to: None,
            },
            last_error: "smtp: timeout".to_string(),
            attempts: 3,
            permanent,
        }
    }

    fn config(smtp: Option<SmtpConfig>, mail_from: Option<&str>, mail_to: Option<&str>) -> Config {
        Config {
            smtp,
            mail_from: mail_from.map(str::to_string),
            mail_to: mail_to.map(str::to_string),
            database_url: None,
            dead_letter_path: "failed_notifications.jsonl".to_string(),
            cms: None,
            default_language: Language::PERSIAN,
            port: 8080,
            api_key: None,
            notification_retry_schedule: "0 */15 * * * *".to_string(),
        }
    }

    fn smtp() -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "apikey".to_string(),
            password: "secret".to_string(),
        }
    }

    fn notifier(
        mailer: Arc<ScriptedMailer>,
        recipients: &str,
        sink: Arc<MemoryDeadLetters>,
    ) -> Notifier {
        Notifier::new(mailer, parse_recipients(recipients), sink).with_retry(RetryConfig::immediate(3))
    }

    // ==================== Recipient Parsing Tests ====================

    #[test]
    fn test_parse_recipients() {
        assert_eq!(
            parse_recipients(" a@ario.studio, not-an-email ,,b@ario.studio,A@ario.studio "),
            vec!["a@ario.studio", "b@ario.studio"]
        );
        assert!(parse_recipients("").is_empty());
        assert!(parse_recipients("nobody").is_empty());
    }

    // ==================== Configuration Tests ====================

    #[test]
    fn test_from_config_without_smtp_only_logs() {
        let sink = Arc::new(MemoryDeadLetters::new());
        let notifier = Notifier::from_config(&config(None, Some("hello@ario.studio"), None), sink);
        assert!(!notifier.delivers());
        assert!(notifier.recipients().is_empty());
    }

    #[test]
    fn test_from_config_smtp_without_sender_only_logs() {
        let sink = Arc::new(MemoryDeadLetters::new());
        let notifier =
            Notifier::from_config(&config(Some(smtp()), None, Some("ops@ario.studio")), sink);
        assert!(!notifier.delivers());
        assert_eq!(notifier.recipients(), ["ops@ario.studio"]);
    }

    #[test]
    fn test_from_config_smtp_with_sender_delivers() {
        let sink = Arc::new(MemoryDeadLetters::new());
        let notifier = Notifier::from_config(
            &config(Some(smtp()), Some("hello@ario.studio"), None),
            sink,
        );
        assert!(notifier.delivers());
    }

    #[test]
    fn test_from_config_drops_invalid_recipients() {
        let sink = Arc::new(MemoryDeadLetters::new());
        let notifier = Notifier::from_config(&config(None, None, Some("bad, ok@x.co")), sink);
        assert_eq!(notifier.recipients(), ["ok@x.co"]);
    }

    // ==================== Delivery Tests ====================

    #[tokio::test]
    async fn test_notify_sends_admin_and_auto_reply() {
        let mailer = Arc::new(ScriptedMailer::default());
        let sink = Arc::new(MemoryDeadLetters::new());
        let notifier = notifier(mailer.clone(), "a@ario.studio,b@ario.studio", sink.clone());

        let report = notifier.notify(&lead()).await;

        assert_eq!(report, DeliveryReport { sent: 3, dead_lettered: 0, lost: 0 });
        assert_eq!(mailer.sent_to(), vec!["a@ario.studio", "b@ario.studio", "jane@x.com"]);
        assert!(sink.all().is_empty());

        let sent = mailer.sent.lock().unwrap();
        let admin = sent.iter().find(|e| e.to == "a@ario.studio").unwrap();
        assert_eq!(admin.reply_to.as_deref(), Some("jane@x.com"));
        assert_eq!(admin.subject, "New project request from Jane");
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let mailer = Arc::new(ScriptedMailer::failing("a@ario.studio", 2));
        let sink = Arc::new(MemoryDeadLetters::new());
        let notifier = notifier(mailer.clone(), "a@ario.studio", sink.clone());

        let report = notifier.send_lead_notification(&lead(), Language::ENGLISH).await;

        assert_eq!(report.sent, 1);
        assert_eq!(*mailer.attempts.lock().unwrap(), 3);
        assert!(sink.all().is_empty());
    }

    #[tokio::test]
    async fn test_exhausted_send_is_dead_lettered() {
        let mailer = Arc::new(ScriptedMailer::failing("a@ario.studio", 10));
        let sink = Arc::new(MemoryDeadLetters::new());
        let notifier = notifier(mailer.clone(), "a@ario.studio,b@ario.studio", sink.clone());

        let report = notifier.notify(&lead()).await;

        assert_eq!(report, DeliveryReport { sent: 2, dead_lettered: 1, lost: 0 });
        let letters = sink.all();
        assert_eq!(letters.len(), 1);
        assert_eq!(letters[0].kind, "lead_notification");
        assert_eq!(letters[0].email.to, "a@ario.studio");
        assert_eq!(letters[0].attempts, 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let mailer = Arc::new(ScriptedMailer {
            permanent: true,
            ..ScriptedMailer::failing("jane@x.com", 10)
        });
        let sink = Arc::new(MemoryDeadLetters::new());
        let notifier = notifier(mailer.clone(), "", sink.clone());

        let report = notifier.send_auto_reply("Jane", "jane@x.com", Language::PERSIAN).await;

        assert_eq!(report.dead_lettered, 1);
        assert_eq!(*mailer.attempts.lock().unwrap(), 1);
        assert_eq!(sink.all()[0].attempts, 1);
        assert!(sink.all()[0].permanent);
    }

    #[tokio::test]
    async fn test_no_recipients_skips_admin_notification() {
        let mailer = Arc::new(ScriptedMailer::default());
        let sink = Arc::new(MemoryDeadLetters::new());
        let notifier = notifier(mailer.clone(), "", sink);

        let report = notifier.notify(&lead()).await;
        assert_eq!(report.sent, 1);
        assert_eq!(mailer.sent_to(), vec!["jane@x.com"]);
    }

    // ==================== Redelivery Tests ====================

    #[tokio::test]
    async fn test_redelivery_resolves_recovered_letters() {
        let mailer = Arc::new(ScriptedMailer::failing("a@ario.studio", 3));
        let sink = Arc::new(MemoryDeadLetters::new());
        let notifier = notifier(mailer.clone(), "a@ario.studio", sink.clone());

        notifier.send_lead_notification(&lead(), Language::ENGLISH).await;
        assert_eq!(sink.pending().await.unwrap().len(), 1);

        let report = notifier.redeliver_dead_letters().await.unwrap();
        assert_eq!(
            report,
            RedeliveryReport { attempted: 1, resolved: 1, ..Default::default() }
        );
        assert!(sink.pending().await.unwrap().is_empty());
        assert_eq!(mailer.sent_to(), vec!["a@ario.studio"]);
    }

    #[tokio::test]
    async fn test_redelivery_records_another_attempt() {
        let mailer = Arc::new(ScriptedMailer::failing("a@ario.studio", 100));
        let sink = Arc::new(MemoryDeadLetters::new());
        let notifier = notifier(mailer, "a@ario.studio", sink.clone());

        notifier.send_lead_notification(&lead(), Language::ENGLISH).await;
        let report = notifier.redeliver_dead_letters().await.unwrap();

        assert_eq!(report.still_failing, 1);
        assert_eq!(sink.all()[0].attempts, 4);
    }

    #[tokio::test]
    async fn test_redelivery_leaves_permanent_failures_alone() {
        let mailer = Arc::new(ScriptedMailer {
            permanent: true,
            ..ScriptedMailer::failing("jane@x.com", 1)
        });
        let sink = Arc::new(MemoryDeadLetters::new());
        let notifier = notifier(mailer.clone(), "", sink.clone());

        notifier.send_auto_reply("Jane", "jane@x.com", Language::ENGLISH).await;
        let report = notifier.redeliver_dead_letters().await.unwrap();

        assert_eq!(report, RedeliveryReport { skipped: 1, ..Default::default() });
        assert_eq!(*mailer.attempts.lock().unwrap(), 1);
        assert!(mailer.sent_to().is_empty());
        assert_eq!(sink.pending().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_redelivery_marks_newly_permanent_failures() {
        let mailer = Arc::new(ScriptedMailer {
            permanent: true,
            ..ScriptedMailer::failing("jane@x.com", 1)
        });
        let sink = Arc::new(MemoryDeadLetters::new());
        sink.record(dead_letter("jane@x.com", false)).await.unwrap();
        let notifier = notifier(mailer.clone(), "", sink.clone());

        let first = notifier.redeliver_dead_letters().await.unwrap();
        assert_eq!(first.still_failing, 1);
        assert!(sink.all()[0].permanent);

        let second = notifier.redeliver_dead_letters().await.unwrap();
        assert_eq!(second.skipped, 1);
        assert_eq!(*mailer.attempts.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_redelivery_continues_past_sink_errors() {
        let mailer = Arc::new(ScriptedMailer::default());
        let sink = Arc::new(FlakySink::default());
        for to in ["a@ario.studio", "b@ario.studio", "c@ario.studio"] {
            sink.record(dead_letter(to, false)).await.unwrap();
        }
        let notifier =
            Notifier::new(mailer.clone(), Vec::new(), sink.clone()).with_retry(RetryConfig::immediate(3));

        let report = notifier.redeliver_dead_letters().await.unwrap();

        assert_eq!(
            report,
            RedeliveryReport { attempted: 3, resolved: 3, unrecorded: 1, ..Default::default() }
        );
        assert_eq!(mailer.sent_to(), vec!["a@ario.studio", "b@ario.studio", "c@ario.studio"]);
        let pending = sink.pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].email.to, "a@ario.studio");
    }

    #[tokio::test]
    async fn test_redelivery_skipped_in_log_only_mode() {
        let sink = Arc::new(MemoryDeadLetters::new());
        sink.record(dead_letter("jane@x.com", false)).await.unwrap();

        let notifier = Notifier::new(Arc::new(LogMailer), Vec::new(), sink.clone());
        let report = notifier.redeliver_dead_letters().await.unwrap();

        assert_eq!(report, RedeliveryReport::default());
        assert_eq!(sink.pending().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_log_only_mode_reports_sent() {
        let sink = Arc::new(MemoryDeadLetters::new());
        let notifier = Notifier::new(
            Arc::new(LogMailer),
            parse_recipients("admin@ario.studio"),
            sink.clone(),
        );

        let report = notifier.notify(&lead()).await;
        assert_eq!(report.sent, 2);
        assert!(!notifier.delivers());
        assert!(sink.all().is_empty());
    }
}
