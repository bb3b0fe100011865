use super::{request_language, AppError, AppState, LangQuery};
use crate::dispatch::SubmissionEnvelope;
use crate::lead::{LeadKind, LeadSubmission};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use tracing::{debug, info, warn};

/// POST /api/start-project
pub async fn start_project(
    State(state): State<AppState>,
    query: Result<Query<LangQuery>, QueryRejection>,
    body: Result<Json<LeadSubmission>, JsonRejection>,
) -> Result<Json<SubmissionEnvelope>, AppError> {
    handle_lead(state, LeadKind::ProjectRequest, LangQuery::lenient(query), body).await
}

/// POST /api/contact
pub async fn contact(
    State(state): State<AppState>,
    query: Result<Query<LangQuery>, QueryRejection>,
    body: Result<Json<LeadSubmission>, JsonRejection>,
) -> Result<Json<SubmissionEnvelope>, AppError> {
    handle_lead(state, LeadKind::Contact, LangQuery::lenient(query), body).await
}

async fn handle_lead(
    state: AppState,
    kind: LeadKind,
    query_lang: Option<String>,
    body: Result<Json<LeadSubmission>, JsonRejection>,
) -> Result<Json<SubmissionEnvelope>, AppError> {
    let default = state.config.default_language;

    let submission = match body {
        Ok(Json(submission)) => submission,
        Err(rejection) => {
            let lang = request_language(&[query_lang.as_deref()], default);
            debug!("Rejected {} body: {}", kind.as_str(), rejection.body_text());
            return Err(AppError::BadRequest {
                lang,
                message: lang.strings().validation_failed.to_string(),
            });
        }
    };

    let lang = request_language(
        &[submission.locale.as_deref(), query_lang.as_deref()],
        default,
    );

    let lead = submission
        .validate(kind, lang)
        .map_err(|errors| {
            debug!("{} submission failed validation: {:?}", kind.as_str(), errors.keys());
            AppError::Validation { lang, errors }
        })?;

    if let Some(store) = &state.leads {
        match store.save_lead(&lead).await {
            Ok(id) => debug!("Saved lead {}", id),
            Err(e) => warn!("Failed to save {} lead: {:#}", kind.as_str(), e),
        }
    }

    let report = state.notifier.notify(&lead).await;
    info!(
        "Accepted {} lead ({}), {} notification(s) sent",
        kind.as_str(),
        lang,
        report.sent
    );

    let strings = lang.strings();
    let message = match kind {
        LeadKind::ProjectRequest => strings.project_request_received,
        LeadKind::Contact => strings.contact_received,
    };

    Ok(Json(SubmissionEnvelope::ok(message)))
}
