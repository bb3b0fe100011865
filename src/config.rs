use crate::i18n::Language;
use anyhow::{Context, Result};

/// SMTP relay settings. Present only when host, user and password are all set.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// Visual-CMS (Sanity) settings used by the content import.
#[derive(Debug, Clone)]
pub struct CmsConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub token: Option<String>,
    /// Base URL of the query API, overridable for tests and self-hosted proxies
    pub api_host: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    // Mail (Brevo SMTP)
    pub smtp: Option<SmtpConfig>,
    pub mail_from: Option<String>,
    /// Raw comma-separated recipient list; parsed and validated at send time
    pub mail_to: Option<String>,

    // Storage
    pub database_url: Option<String>,
    pub dead_letter_path: String,

    // Visual CMS
    pub cms: Option<CmsConfig>,

    // Site
    pub default_language: Language,

    // Server
    pub port: u16,
    pub api_key: Option<String>,

    // Scheduler
    pub notification_retry_schedule: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let admin_email = env_opt("ADMIN_EMAIL");

        // SMTP - all three credentials or nothing (log-only mode)
        let smtp = match (
            env_opt("BREVO_SMTP_HOST"),
            env_opt("BREVO_SMTP_USER"),
            env_opt("BREVO_SMTP_PASS"),
        ) {
            (Some(host), Some(username), Some(password)) => Some(SmtpConfig {
                host,
                port: match env_opt("BREVO_SMTP_PORT") {
                    Some(port) => port
                        .parse()
                        .with_context(|| format!("Invalid BREVO_SMTP_PORT: {}", port))?,
                    None => 587,
                },
                username,
                password,
            }),
            _ => None,
        };

        let cms = env_opt("SANITY_PROJECT_ID").map(|project_id| {
            let api_version =
                env_opt("SANITY_API_VERSION").unwrap_or_else(|| "2024-01-01".to_string());
            let api_host = env_opt("SANITY_API_HOST")
                .unwrap_or_else(|| format!("https://{}.api.sanity.io", project_id));
            CmsConfig {
                dataset: env_opt("SANITY_DATASET").unwrap_or_else(|| "production".to_string()),
                api_version: api_version.trim_start_matches('v').to_string(),
                token: env_opt("SANITY_API_TOKEN"),
                api_host,
                project_id,
            }
        });

        Ok(Self {
            smtp,
            mail_from: env_opt("CONTACT_FROM_EMAIL").or_else(|| admin_email.clone()),
            mail_to: env_opt("CONTACT_TO_EMAIL").or(admin_email),

            database_url: env_opt("DATABASE_URL"),
            dead_letter_path: env_opt("DEAD_LETTER_PATH")
                .unwrap_or_else(|| "failed_notifications.jsonl".to_string()),

            cms,

            default_language: Language::from_code_or(
                env_opt("DEFAULT_LOCALE").as_deref(),
                Language::PERSIAN,
            ),

            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            api_key: env_opt("API_KEY"),

            notification_retry_schedule: env_opt("NOTIFICATION_RETRY_SCHEDULE")
                .unwrap_or_else(|| "0 */15 * * * *".to_string()),
        })
    }
}

/// Read an environment variable, treating empty values as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
