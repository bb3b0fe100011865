//! Operator endpoints, guarded by `X-API-Key`.
//!
//! When `API_KEY` is unset every admin route answers 404.

use super::{AppError, AppState};
use crate::email::{DeadLetter, RedeliveryReport};
use crate::i18n::{ResolutionMetrics, ResolutionReport};
use crate::security::{check_api_key, KeyCheck, API_KEY_HEADER};
use axum::{extract::State, http::HeaderMap, Json};
use tracing::info;

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let lang = state.config.default_language;
    let provided = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());

    match check_api_key(state.config.api_key.as_deref(), provided) {
        KeyCheck::Accepted => Ok(()),
        KeyCheck::Rejected => Err(AppError::Unauthorized { lang }),
        KeyCheck::Disabled => Err(AppError::NotFound { lang }),
    }
}

/// GET /api/admin/notifications/failed
pub async fn list_failed(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<DeadLetter>>, AppError> {
    authorize(&state, &headers)?;

    let pending = state
        .dead_letters
        .pending()
        .await
        .map_err(|e| AppError::internal(state.config.default_language, e))?;

    Ok(Json(pending))
}

/// POST /api/admin/notifications/retry
pub async fn retry_failed(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RedeliveryReport>, AppError> {
    authorize(&state, &headers)?;
    info!("Manual notification redelivery requested");

    let report = state
        .notifier
        .redeliver_dead_letters()
        .await
        .map_err(|e| AppError::internal(state.config.default_language, e))?;

    Ok(Json(report))
}

/// GET /api/admin/resolution-metrics
pub async fn resolution_metrics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ResolutionReport>, AppError> {
    authorize(&state, &headers)?;
    Ok(Json(ResolutionMetrics::global().report()))
}
