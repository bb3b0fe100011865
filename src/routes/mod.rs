//! HTTP surface: lead endpoints, localized content reads, health and admin.

pub mod admin;
pub mod content;
pub mod error;
pub mod health;
pub mod leads;

pub use error::AppError;

use crate::config::Config;
use crate::content::ContentQuery;
use crate::email::{DeadLetterSink, Notifier};
use crate::i18n::Language;
use crate::lead::LeadStore;
use axum::{
    extract::{rejection::QueryRejection, Query},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::debug;

/// Shared, read-only handler state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub content: ContentQuery,
    pub notifier: Arc<Notifier>,
    /// Absent when no database is configured
    pub leads: Option<Arc<dyn LeadStore>>,
    pub dead_letters: Arc<dyn DeadLetterSink>,
}

/// `?lang=` on any route.
#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

impl LangQuery {
    /// The `lang` parameter, or none when the query string did not parse.
    pub fn lenient(query: Result<Query<LangQuery>, QueryRejection>) -> Option<String> {
        match query {
            Ok(Query(query)) => query.lang,
            Err(rejection) => {
                debug!("Ignoring malformed query string: {}", rejection.body_text());
                None
            }
        }
    }
}

/// First supported language among the candidates, else `default`.
pub fn request_language(candidates: &[Option<&str>], default: Language) -> Language {
    candidates
        .iter()
        .flatten()
        .find_map(|code| Language::from_code(code).ok())
        .unwrap_or(default)
}

pub fn create_app(state: AppState) -> Router {
    let default_language = state.config.default_language;

    Router::new()
        .route("/api/start-project", post(leads::start_project))
        .route("/api/contact", post(leads::contact))
        .route("/api/content/:content_type", get(content::list_content))
        .route("/api/content/:content_type/:slug", get(content::get_content))
        .route("/api/admin/notifications/failed", get(admin::list_failed))
        .route("/api/admin/notifications/retry", post(admin::retry_failed))
        .route("/api/admin/resolution-metrics", get(admin::resolution_metrics))
        .route("/health", get(health::health))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(
            move |_panic: Box<dyn Any + Send + 'static>| error::panic_response(default_language),
        ))
        .with_state(state)
}
