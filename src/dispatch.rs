//! Form submission over HTTP.
//!
//! One POST per call: no retry, no queueing and no idempotency key, so a
//! second click is a second submission.

use crate::form::FieldErrors;
use crate::i18n::Language;
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// JSON body shared by every lead endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl SubmissionEnvelope {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            errors: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = Some(errors);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessInfo {
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureInfo {
    /// Localized, user-presentable message
    pub message: String,
    /// Per-field errors reported by the server
    pub errors: FieldErrors,
}

impl FailureInfo {
    pub fn generic(lang: Language) -> Self {
        Self {
            message: lang.strings().generic_failure.to_string(),
            errors: FieldErrors::new(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server returned {status} without a response envelope")]
    Status { status: u16 },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Sends a serialized form somewhere and reports the outcome.
#[async_trait]
pub trait SubmissionDispatcher: Send + Sync {
    async fn submit(
        &self,
        endpoint: &str,
        payload: &Value,
        lang: Language,
    ) -> Result<SuccessInfo, FailureInfo>;
}

/// Posts JSON to `base_url + endpoint`.
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDispatcher {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post(
        &self,
        endpoint: &str,
        payload: &Value,
    ) -> Result<(reqwest::StatusCode, SubmissionEnvelope), DispatchError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("Submitting form to {}", url);

        let response = self.client.post(&url).json(payload).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<SubmissionEnvelope>(&body) {
            Ok(envelope) => Ok((status, envelope)),
            Err(_) if !status.is_success() => Err(DispatchError::Status {
                status: status.as_u16(),
            }),
            Err(e) => Err(DispatchError::Malformed(e.to_string())),
        }
    }
}

#[async_trait]
impl SubmissionDispatcher for HttpDispatcher {
    async fn submit(
        &self,
        endpoint: &str,
        payload: &Value,
        lang: Language,
    ) -> Result<SuccessInfo, FailureInfo> {
        let (status, envelope) = match self
            .post(endpoint, payload)
            .await
            .with_context(|| format!("Submission to {} failed", endpoint))
        {
            Ok(result) => result,
            Err(e) => {
                warn!("{:#}", e);
                return Err(FailureInfo::generic(lang));
            }
        };

        if status.is_success() && envelope.success {
            return Ok(SuccessInfo {
                message: envelope.message,
            });
        }

        debug!("Submission to {} rejected ({})", endpoint, status);
        Err(FailureInfo {
            message: envelope
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| lang.strings().generic_failure.to_string()),
            errors: envelope.errors.unwrap_or_default(),
        })
    }
}
