use super::{request_language, AppError, AppState, LangQuery};
use crate::content::{ContentType, LocalizedContent};
use crate::i18n::Language;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::debug;

const DEFAULT_FEATURED_LIMIT: usize = 3;
const MAX_LIMIT: usize = 50;

/// Query parameters for GET /api/content/:content_type
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub lang: Option<String>,
    #[serde(default)]
    pub featured: bool,
    pub limit: Option<usize>,
}

fn parse_type(raw: &str, lang: Language) -> Result<ContentType, AppError> {
    raw.parse().map_err(|_| AppError::BadRequest {
        lang,
        message: lang.strings().unknown_content_type.to_string(),
    })
}

/// GET /api/content/:content_type?lang=&featured=&limit=
pub async fn list_content(
    State(state): State<AppState>,
    Path(content_type): Path<String>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<LocalizedContent>>, AppError> {
    let default = state.config.default_language;
    let Query(params) = params.map_err(|rejection| {
        debug!("Rejected content query: {}", rejection.body_text());
        AppError::BadRequest {
            lang: default,
            message: default.strings().validation_failed.to_string(),
        }
    })?;

    let lang = request_language(&[params.lang.as_deref()], default);
    let content_type = parse_type(&content_type, lang)?;

    let items = if params.featured {
        let limit = params
            .limit
            .unwrap_or(DEFAULT_FEATURED_LIMIT)
            .min(MAX_LIMIT);
        state
            .content
            .list_featured(content_type, lang.code(), limit)
            .await
    } else {
        let mut items = state.content.list_by_type(content_type, lang.code()).await;
        if let Some(limit) = params.limit {
            items.truncate(limit.min(MAX_LIMIT));
        }
        items
    };

    Ok(Json(items))
}

/// GET /api/content/:content_type/:slug?lang=
pub async fn get_content(
    State(state): State<AppState>,
    Path((content_type, slug)): Path<(String, String)>,
    query: Result<Query<LangQuery>, QueryRejection>,
) -> Result<Json<LocalizedContent>, AppError> {
    let query_lang = LangQuery::lenient(query);
    let lang = request_language(&[query_lang.as_deref()], state.config.default_language);
    let content_type = parse_type(&content_type, lang)?;

    state
        .content
        .get_by_slug(&slug, lang.code())
        .await
        .filter(|item| item.content_type == content_type)
        .map(Json)
        .ok_or(AppError::NotFound { lang })
}
