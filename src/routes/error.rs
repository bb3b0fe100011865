use crate::dispatch::SubmissionEnvelope;
use crate::form::FieldErrors;
use crate::i18n::Language;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

/// Route-level failure, rendered as the shared JSON envelope.
///
/// Clients only ever see a localized message; internal details go to the log.
#[derive(Debug)]
pub enum AppError {
    /// Per-field validation failures
    Validation { lang: Language, errors: FieldErrors },
    BadRequest { lang: Language, message: String },
    NotFound { lang: Language },
    Unauthorized { lang: Language },
    Internal { lang: Language, source: anyhow::Error },
}

impl AppError {
    pub fn internal(lang: Language, source: impl Into<anyhow::Error>) -> Self {
        AppError::Internal {
            lang,
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let envelope = match self {
            AppError::Validation { lang, errors } => {
                SubmissionEnvelope::failed(lang.strings().validation_failed).with_errors(errors)
            }
            AppError::BadRequest { message, .. } => SubmissionEnvelope::failed(message),
            AppError::NotFound { lang } => SubmissionEnvelope::failed(lang.strings().content_not_found),
            AppError::Unauthorized { lang } => SubmissionEnvelope::failed(lang.strings().unauthorized),
            AppError::Internal { lang, source } => {
                error!("Request failed: {:#}", source);
                SubmissionEnvelope::failed(lang.strings().generic_failure)
            }
        };

        (status, Json(envelope)).into_response()
    }
}

/// 500 envelope for a handler that panicked.
pub fn panic_response(lang: Language) -> Response {
    error!("Handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(SubmissionEnvelope::failed(lang.strings().generic_failure)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let lang = Language::ENGLISH;
        assert_eq!(
            AppError::Validation {
                lang,
                errors: FieldErrors::new()
            }
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NotFound { lang }.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Unauthorized { lang }.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::internal(lang, anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_error_hides_details() {
        let response = AppError::internal(Language::PERSIAN, anyhow::anyhow!("pool timed out"))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
