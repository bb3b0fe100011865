use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of content entity shown on the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Portfolio,
    Service,
    Blog,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [ContentType::Portfolio, ContentType::Service, ContentType::Blog];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Portfolio => "portfolio",
            ContentType::Service => "service",
            ContentType::Blog => "blog",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "portfolio" | "project" | "projects" => Ok(ContentType::Portfolio),
            "service" | "services" => Ok(ContentType::Service),
            "blog" | "post" | "posts" => Ok(ContentType::Blog),
            other => Err(format!("Unknown content type: '{}'", other)),
        }
    }
}

/// Language-agnostic content row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    pub id: i64,
    pub content_type: ContentType,
    /// Global slug, shared by every translation
    pub slug: String,
    pub published: bool,
    pub archived: bool,
    pub featured: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Content {
    /// Whether the public site may show this entity.
    pub fn is_visible(&self) -> bool {
        self.published && !self.archived
    }
}

/// Per-language content. At most one exists per (content, lang).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTranslation {
    pub lang: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub excerpt: Option<String>,
    pub body: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,

    // Case-study layout sections
    pub intro: Option<String>,
    pub problem: Option<String>,
    pub solution: Option<String>,
    pub process: Option<String>,
    pub result: Option<String>,

    pub featured_image: Option<String>,
    #[serde(default)]
    pub gallery: Vec<String>,
}

impl ContentTranslation {
    pub fn new(lang: &str, title: &str) -> Self {
        Self {
            lang: lang.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }
}

/// A content row together with its translations in storage order.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRecord {
    pub content: Content,
    pub translations: Vec<ContentTranslation>,
}

/// Input for creating or updating a content entity and its translations.
#[derive(Debug, Clone)]
pub struct ContentDraft {
    pub content_type: ContentType,
    pub slug: String,
    pub published: bool,
    pub archived: bool,
    pub featured: bool,
    pub sort_order: i32,
    /// Keeps the original creation time when importing
    pub created_at: Option<DateTime<Utc>>,
    pub translations: Vec<ContentTranslation>,
}

/// Render-ready view of a content entity in one language.
///
/// Built on every read, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedContent {
    pub id: i64,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub slug: String,
    pub featured: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Language the client asked for
    pub requested_lang: String,
    /// Language of the translation actually shown
    pub lang: String,

    pub title: String,
    pub subtitle: Option<String>,
    pub excerpt: Option<String>,
    pub body: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub tags: Vec<String>,
    pub intro: Option<String>,
    pub problem: Option<String>,
    pub solution: Option<String>,
    pub process: Option<String>,
    pub result: Option<String>,
    pub featured_image: Option<String>,
    pub gallery: Vec<String>,
}

impl LocalizedContent {
    pub fn merge(content: &Content, translation: &ContentTranslation, requested_lang: &str) -> Self {
        let t = translation.clone();
        Self {
            id: content.id,
            content_type: content.content_type,
            slug: content.slug.clone(),
            featured: content.featured,
            sort_order: content.sort_order,
            created_at: content.created_at,
            updated_at: content.updated_at,
            requested_lang: requested_lang.to_string(),
            lang: t.lang,
            title: t.title,
            subtitle: t.subtitle,
            excerpt: t.excerpt,
            body: t.body,
            meta_title: t.meta_title,
            meta_description: t.meta_description,
            tags: t.tags,
            intro: t.intro,
            problem: t.problem,
            solution: t.solution,
            process: t.process,
            result: t.result,
            featured_image: t.featured_image,
            gallery: t.gallery,
        }
    }

    /// True when the shown translation is not the requested language.
    pub fn is_fallback(&self) -> bool {
        !self.lang.eq_ignore_ascii_case(&self.requested_lang)
    }
}
