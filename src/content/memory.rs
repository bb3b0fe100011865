//! In-process content source.
//!
//! Used when no database is configured (the site then serves whatever was
//! seeded, usually nothing) and as the fixture store in tests.

use super::model::{Content, ContentDraft, ContentRecord, ContentTranslation};
use super::query::{sort_for_display, ContentError, ContentSource, ContentWriter, ListFilter};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::RwLock;

#[derive(Default)]
pub struct MemoryContentStore {
    records: RwLock<Vec<ContentRecord>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ContentRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Insert a record, replacing any existing record with the same slug.
    pub fn insert(&self, record: ContentRecord) {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.retain(|r| r.content.slug != record.content.slug);
        records.push(record);
    }

    /// Add or replace one translation of an existing record.
    ///
    /// Returns `false` when no record has the given slug.
    pub fn upsert_translation(&self, slug: &str, translation: ContentTranslation) -> bool {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        let Some(record) = records.iter_mut().find(|r| r.content.slug == slug) else {
            return false;
        };

        match record
            .translations
            .iter_mut()
            .find(|t| t.lang == translation.lang)
        {
            Some(existing) => *existing = translation,
            None => record.translations.push(translation),
        }
        true
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ContentSource for MemoryContentStore {
    async fn fetch_list(&self, filter: ListFilter) -> Result<Vec<ContentRecord>, ContentError> {
        let records = self
            .records
            .read()
            .map_err(|_| ContentError::Unavailable("content store lock poisoned".to_string()))?;

        let mut matching: Vec<ContentRecord> = records
            .iter()
            .filter(|r| {
                r.content.content_type == filter.content_type
                    && r.content.is_visible()
                    && (!filter.featured_only || r.content.featured)
            })
            .cloned()
            .collect();
        sort_for_display(&mut matching);

        Ok(matching)
    }

    async fn fetch_by_slug(&self, slug: &str) -> Result<Option<ContentRecord>, ContentError> {
        let records = self
            .records
            .read()
            .map_err(|_| ContentError::Unavailable("content store lock poisoned".to_string()))?;

        Ok(records
            .iter()
            .find(|r| r.content.slug == slug && r.content.is_visible())
            .cloned())
    }
}

#[async_trait]
impl ContentWriter for MemoryContentStore {
    async fn upsert_content(&self, draft: ContentDraft) -> Result<i64, ContentError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| ContentError::Unavailable("content store lock poisoned".to_string()))?;
        let now = Utc::now();

        let index = match records.iter().position(|r| r.content.slug == draft.slug) {
            Some(index) => index,
            None => {
                let id = records.iter().map(|r| r.content.id).max().unwrap_or(0) + 1;
                records.push(ContentRecord {
                    content: Content {
                        id,
                        content_type: draft.content_type,
                        slug: draft.slug.clone(),
                        published: draft.published,
                        archived: draft.archived,
                        featured: draft.featured,
                        sort_order: draft.sort_order,
                        created_at: draft.created_at.unwrap_or(now),
                        updated_at: now,
                    },
                    translations: Vec::new(),
                });
                records.len() - 1
            }
        };

        let record = &mut records[index];
        let content = &mut record.content;
        content.content_type = draft.content_type;
        content.published = draft.published;
        content.archived = draft.archived;
        content.featured = draft.featured;
        content.sort_order = draft.sort_order;
        if let Some(created_at) = draft.created_at {
            content.created_at = created_at;
        }
        content.updated_at = now;

        for translation in draft.translations {
            match record
                .translations
                .iter_mut()
                .find(|t| t.lang == translation.lang)
            {
                Some(existing) => *existing = translation,
                None => record.translations.push(translation),
            }
        }

        Ok(record.content.id)
    }
}
