//! Localized content reads.
//!
//! Data-source failures never reach callers: they are logged and degraded to
//! an empty list or `None`.

use super::model::{ContentDraft, ContentRecord, ContentType, LocalizedContent};
use super::resolver::{resolve_with_outcome, Resolution};
use crate::i18n::ResolutionMetrics;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("CMS request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CMS returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed content: {0}")]
    Decode(String),

    #[error("content source unavailable: {0}")]
    Unavailable(String),
}

/// Which entities a list read wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListFilter {
    pub content_type: ContentType,
    pub featured_only: bool,
}

/// Where content rows and their translations come from.
///
/// Implementations return only published, non-archived entities, with each
/// entity's translations in storage (insertion) order.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_list(&self, filter: ListFilter) -> Result<Vec<ContentRecord>, ContentError>;

    async fn fetch_by_slug(&self, slug: &str) -> Result<Option<ContentRecord>, ContentError>;
}

/// Typed write access, used by the CMS import.
#[async_trait]
pub trait ContentWriter: Send + Sync {
    /// Create or update the entity with `draft.slug` and upsert each of its
    /// translations by language. Returns the entity id.
    async fn upsert_content(&self, draft: ContentDraft) -> Result<i64, ContentError>;
}

#[derive(Clone)]
pub struct ContentQuery {
    source: Arc<dyn ContentSource>,
}

impl ContentQuery {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    /// All visible entities of a type, ordered by manual order then newest first.
    pub async fn list_by_type(&self, content_type: ContentType, lang: &str) -> Vec<LocalizedContent> {
        self.list(
            ListFilter {
                content_type,
                featured_only: false,
            },
            lang,
        )
        .await
    }

    /// Featured entities of a type, capped at `limit`.
    pub async fn list_featured(
        &self,
        content_type: ContentType,
        lang: &str,
        limit: usize,
    ) -> Vec<LocalizedContent> {
        let mut items = self
            .list(
                ListFilter {
                    content_type,
                    featured_only: true,
                },
                lang,
            )
            .await;
        items.truncate(limit);
        items
    }

    /// One entity by its global slug.
    pub async fn get_by_slug(&self, slug: &str, lang: &str) -> Option<LocalizedContent> {
        let record = match self.source.fetch_by_slug(slug).await {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(e) => {
                warn!("Content lookup for slug '{}' failed: {}", slug, e);
                return None;
            }
        };

        if !record.content.is_visible() {
            return None;
        }

        localize(&record, lang)
    }

    async fn list(&self, filter: ListFilter, lang: &str) -> Vec<LocalizedContent> {
        let mut records = match self.source.fetch_list(filter).await {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    "Content list for {} (featured_only={}) failed: {}",
                    filter.content_type, filter.featured_only, e
                );
                return Vec::new();
            }
        };

        records.retain(|r| {
            r.content.content_type == filter.content_type
                && r.content.is_visible()
                && (!filter.featured_only || r.content.featured)
        });
        sort_for_display(&mut records);

        records.iter().filter_map(|r| localize(r, lang)).collect()
    }
}

/// Manual order ascending, then creation time descending.
pub fn sort_for_display(records: &mut [ContentRecord]) {
    records.sort_by(|a, b| {
        a.content
            .sort_order
            .cmp(&b.content.sort_order)
            .then_with(|| b.content.created_at.cmp(&a.content.created_at))
    });
}

fn localize(record: &ContentRecord, lang: &str) -> Option<LocalizedContent> {
    let metrics = ResolutionMetrics::global();

    match resolve_with_outcome(&record.translations, lang) {
        Some((translation, outcome)) => {
            match outcome {
                Resolution::Exact => metrics.record_exact(),
                Resolution::EnglishFallback => metrics.record_english_fallback(),
                Resolution::FirstAvailable => {
                    metrics.record_first_available();
                    warn!(
                        "Content '{}' has no '{}' or English translation, showing '{}'",
                        record.content.slug, lang, translation.lang
                    );
                }
            }
            Some(LocalizedContent::merge(&record.content, translation, lang))
        }
        None => {
            metrics.record_missing();
            warn!("Content '{}' has no translations, skipping", record.content.slug);
            None
        }
    }
}
