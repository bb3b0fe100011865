//! One-time import of visual-CMS (Sanity) documents into the content tables.
//!
//! CMS documents store each language as a paired `{ fa, en }` field. The
//! import splits them into per-language translations so the site has a
//! single multilingual storage model.

use crate::config::CmsConfig;
use crate::content::{ContentDraft, ContentError, ContentTranslation, ContentType, ContentWriter};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Document types that map onto a content type.
pub const IMPORTED_TYPES: [&str; 3] = ["project", "service", "blogPost"];

const LANGS: [&str; 2] = ["fa", "en"];

/// A string field with one value per language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Paired {
    pub fa: Option<String>,
    pub en: Option<String>,
}

impl Paired {
    fn get(&self, lang: &str) -> Option<String> {
        let value = match lang {
            "fa" => self.fa.as_deref(),
            "en" => self.en.as_deref(),
            _ => None,
        };
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PairedList {
    #[serde(default)]
    pub fa: Vec<String>,
    #[serde(default)]
    pub en: Vec<String>,
}

impl PairedList {
    fn get(&self, lang: &str) -> Vec<String> {
        match lang {
            "fa" => self.fa.clone(),
            "en" => self.en.clone(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Slug {
    pub current: String,
}

/// A document as returned by the GROQ projection in [`SanityClient::fetch_documents`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanityDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_type")]
    pub doc_type: String,
    #[serde(rename = "_createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    pub slug: Option<Slug>,
    #[serde(default)]
    pub title: Paired,
    #[serde(default)]
    pub subtitle: Paired,
    #[serde(default)]
    pub excerpt: Paired,
    #[serde(default)]
    pub body: Paired,
    #[serde(default)]
    pub seo_title: Paired,
    #[serde(default)]
    pub seo_description: Paired,
    #[serde(default)]
    pub intro: Paired,
    #[serde(default)]
    pub problem: Paired,
    #[serde(default)]
    pub solution: Paired,
    #[serde(default)]
    pub process: Paired,
    #[serde(default)]
    pub result: Paired,
    #[serde(default)]
    pub tags: PairedList,
    #[serde(default)]
    pub featured: bool,
    pub order: Option<i32>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub gallery: Vec<String>,
}

pub fn content_type_for(doc_type: &str) -> Option<ContentType> {
    match doc_type {
        "project" => Some(ContentType::Portfolio),
        "service" => Some(ContentType::Service),
        "blogPost" => Some(ContentType::Blog),
        _ => None,
    }
}

impl SanityDocument {
    /// Split the paired fields into translations.
    ///
    /// Returns `None` for document types without a content type (testimonials,
    /// site settings) and for documents without a slug or any titled language.
    pub fn into_draft(self) -> Option<ContentDraft> {
        let content_type = content_type_for(&self.doc_type)?;
        let slug = self
            .slug
            .as_ref()
            .map(|s| s.current.trim().to_string())
            .filter(|s| !s.is_empty())?;

        let translations: Vec<ContentTranslation> = LANGS
            .iter()
            .filter_map(|lang| {
                let title = self.title.get(lang)?;
                Some(ContentTranslation {
                    lang: lang.to_string(),
                    title,
                    subtitle: self.subtitle.get(lang),
                    excerpt: self.excerpt.get(lang),
                    body: self.body.get(lang),
                    meta_title: self.seo_title.get(lang),
                    meta_description: self.seo_description.get(lang),
                    tags: self.tags.get(lang),
                    intro: self.intro.get(lang),
                    problem: self.problem.get(lang),
                    solution: self.solution.get(lang),
                    process: self.process.get(lang),
                    result: self.result.get(lang),
                    featured_image: self.image_url.clone(),
                    gallery: self.gallery.clone(),
                })
            })
            .collect();

        if translations.is_empty() {
            return None;
        }

        Some(ContentDraft {
            content_type,
            slug,
            published: true,
            archived: false,
            featured: self.featured,
            sort_order: self.order.unwrap_or(0),
            created_at: self.created_at,
            translations,
        })
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    result: Vec<SanityDocument>,
}

/// Read-only client for the CMS query API.
pub struct SanityClient {
    client: reqwest::Client,
    config: CmsConfig,
}

impl SanityClient {
    pub fn new(config: CmsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn query_url(&self) -> String {
        format!(
            "{}/v{}/data/query/{}",
            self.config.api_host.trim_end_matches('/'),
            self.config.api_version,
            self.config.dataset
        )
    }

    /// Published documents of one type. Drafts are excluded.
    pub async fn fetch_documents(&self, doc_type: &str) -> Result<Vec<SanityDocument>, ContentError> {
        let groq = format!(
            r#"*[_type == "{}" && !(_id in path("drafts.**"))] | order(_createdAt asc) {{
  _id, _type, _createdAt, slug, title, subtitle, excerpt, body, seoTitle, seoDescription,
  intro, problem, solution, process, result, tags, featured, order,
  "imageUrl": mainImage.asset->url,
  "gallery": coalesce(gallery[].asset->url, [])
}}"#,
            doc_type
        );

        let mut request = self.client.get(self.query_url()).query(&[("query", groq.as_str())]);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        debug!("Querying CMS for '{}' documents", doc_type);
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ContentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: QueryResponse =
            serde_json::from_str(&body).map_err(|e| ContentError::Decode(e.to_string()))?;

        Ok(parsed.result)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Copy every importable document into `writer`.
///
/// A failing document is logged and counted; a failing fetch aborts the import.
pub async fn import_all(
    client: &SanityClient,
    writer: &dyn ContentWriter,
) -> Result<ImportReport, ContentError> {
    let mut report = ImportReport::default();

    for doc_type in IMPORTED_TYPES {
        let documents = client.fetch_documents(doc_type).await?;
        info!("Fetched {} '{}' document(s)", documents.len(), doc_type);

        for document in documents {
            let id = document.id.clone();
            let Some(draft) = document.into_draft() else {
                debug!("Skipping '{}': no slug or no titled language", id);
                report.skipped += 1;
                continue;
            };

            match writer.upsert_content(draft).await {
                Ok(_) => report.imported += 1,
                Err(e) => {
                    warn!("Failed to import '{}': {}", id, e);
                    report.failed += 1;
                }
            }
        }
    }

    info!(
        "CMS import finished: {} imported, {} skipped, {} failed",
        report.imported, report.skipped, report.failed
    );

    Ok(report)
}
