use crate::content::{
    Content, ContentDraft, ContentError, ContentRecord, ContentSource, ContentTranslation,
    ContentWriter, ListFilter,
};
use crate::email::{DeadLetter, DeadLetterSink, NewDeadLetter, OutgoingEmail};
use crate::lead::{Lead, LeadStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

// ==================== Row Types ====================

#[derive(Debug, FromRow)]
struct ContentRow {
    id: i64,
    content_type: String,
    slug: String,
    published: bool,
    archived: bool,
    featured: bool,
    sort_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ContentRow> for Content {
    type Error = ContentError;

    fn try_from(row: ContentRow) -> Result<Self, Self::Error> {
        Ok(Content {
            id: row.id,
            content_type: row.content_type.parse().map_err(ContentError::Decode)?,
            slug: row.slug,
            published: row.published,
            archived: row.archived,
            featured: row.featured,
            sort_order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct TranslationRow {
    content_id: i64,
    lang: String,
    title: String,
    subtitle: Option<String>,
    excerpt: Option<String>,
    body: Option<String>,
    meta_title: Option<String>,
    meta_description: Option<String>,
    tags: Vec<String>,
    intro: Option<String>,
    problem: Option<String>,
    solution: Option<String>,
    process: Option<String>,
    result: Option<String>,
    featured_image: Option<String>,
    gallery: Vec<String>,
}

impl From<TranslationRow> for ContentTranslation {
    fn from(row: TranslationRow) -> Self {
        ContentTranslation {
            lang: row.lang,
            title: row.title,
            subtitle: row.subtitle,
            excerpt: row.excerpt,
            body: row.body,
            meta_title: row.meta_title,
            meta_description: row.meta_description,
            tags: row.tags,
            intro: row.intro,
            problem: row.problem,
            solution: row.solution,
            process: row.process,
            result: row.result,
            featured_image: row.featured_image,
            gallery: row.gallery,
        }
    }
}

#[derive(Debug, FromRow)]
struct DeadLetterRow {
    id: i64,
    kind: String,
    recipient: String,
    subject: String,
    html_body: String,
    text_body: String,
    reply_to: Option<String>,
    last_error: String,
    attempts: i32,
    permanent: bool,
    created_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
}

impl From<DeadLetterRow> for DeadLetter {
    fn from(row: DeadLetterRow) -> Self {
        DeadLetter {
            id: row.id,
            kind: row.kind,
            email: OutgoingEmail {
                to: row.recipient,
                subject: row.subject,
                html: row.html_body,
                text: row.text_body,
                reply_to: row.reply_to,
            },
            last_error: row.last_error,
            attempts: row.attempts,
            permanent: row.permanent,
            created_at: row.created_at,
            resolved_at: row.resolved_at,
        }
    }
}

const CONTENT_COLUMNS: &str = "id, type AS content_type, slug, published, archived, featured, sort_order, created_at, updated_at";

const TRANSLATION_COLUMNS: &str = "content_id, lang, title, subtitle, excerpt, body, meta_title, meta_description, tags, intro, problem, solution, process, result, featured_image, gallery";

// ==================== Schema ====================

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "content",
        "CREATE TABLE IF NOT EXISTS content (
            id BIGSERIAL PRIMARY KEY,
            type TEXT NOT NULL CHECK (type IN ('portfolio', 'service', 'blog')),
            slug TEXT NOT NULL UNIQUE,
            published BOOLEAN NOT NULL DEFAULT false,
            archived BOOLEAN NOT NULL DEFAULT false,
            featured BOOLEAN NOT NULL DEFAULT false,
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    ),
    (
        "content listing index",
        "CREATE INDEX IF NOT EXISTS idx_content_listing
            ON content (type, published, archived, sort_order, created_at DESC)",
    ),
    (
        "content_translations",
        "CREATE TABLE IF NOT EXISTS content_translations (
            id BIGSERIAL PRIMARY KEY,
            content_id BIGINT NOT NULL REFERENCES content(id) ON DELETE CASCADE,
            lang TEXT NOT NULL CHECK (lang IN ('fa', 'en')),
            title TEXT NOT NULL,
            subtitle TEXT,
            excerpt TEXT,
            body TEXT,
            meta_title TEXT,
            meta_description TEXT,
            tags TEXT[] NOT NULL DEFAULT '{}',
            intro TEXT,
            problem TEXT,
            solution TEXT,
            process TEXT,
            result TEXT,
            featured_image TEXT,
            gallery TEXT[] NOT NULL DEFAULT '{}',
            UNIQUE (content_id, lang)
        )",
    ),
    (
        "leads",
        "CREATE TABLE IF NOT EXISTS leads (
            id BIGSERIAL PRIMARY KEY,
            kind TEXT NOT NULL,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT,
            company TEXT,
            website TEXT,
            project_type TEXT,
            project_type_other TEXT,
            budget TEXT,
            deadline TEXT,
            message TEXT,
            service TEXT,
            locale TEXT NOT NULL,
            source_url TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    ),
    (
        "notification_failures",
        "CREATE TABLE IF NOT EXISTS notification_failures (
            id BIGSERIAL PRIMARY KEY,
            kind TEXT NOT NULL,
            recipient TEXT NOT NULL,
            subject TEXT NOT NULL,
            html_body TEXT NOT NULL,
            text_body TEXT NOT NULL,
            reply_to TEXT,
            last_error TEXT NOT NULL,
            attempts INTEGER NOT NULL DEFAULT 1,
            permanent BOOLEAN NOT NULL DEFAULT false,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            resolved_at TIMESTAMPTZ
        )",
    ),
    (
        "notification_failures.permanent",
        "ALTER TABLE notification_failures
            ADD COLUMN IF NOT EXISTS permanent BOOLEAN NOT NULL DEFAULT false",
    ),
];

impl Database {
    /// Open a connection pool and verify it with a round trip.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .context("Database did not answer")?;

        Ok(Self { pool })
    }

    /// Create tables and indexes if they do not exist yet.
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations...");
        for (name, statement) in MIGRATIONS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to create {}", name))?;
        }
        info!("✓ Database schema ready");
        Ok(())
    }

    async fn load_translations(
        &self,
        ids: &[i64],
    ) -> Result<HashMap<i64, Vec<ContentTranslation>>, ContentError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, TranslationRow>(&format!(
            "SELECT {} FROM content_translations WHERE content_id = ANY($1) ORDER BY id",
            TRANSLATION_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_content: HashMap<i64, Vec<ContentTranslation>> = HashMap::new();
        for row in rows {
            by_content.entry(row.content_id).or_default().push(row.into());
        }
        Ok(by_content)
    }
}

// ==================== Content ====================

#[async_trait]
impl ContentSource for Database {
    async fn fetch_list(&self, filter: ListFilter) -> Result<Vec<ContentRecord>, ContentError> {
        let rows = sqlx::query_as::<_, ContentRow>(&format!(
            "SELECT {} FROM content
             WHERE type = $1 AND published AND NOT archived AND ($2 = false OR featured)
             ORDER BY sort_order ASC, created_at DESC",
            CONTENT_COLUMNS
        ))
        .bind(filter.content_type.as_str())
        .bind(filter.featured_only)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut translations = self.load_translations(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let content = Content::try_from(row)?;
                Ok(ContentRecord {
                    translations: translations.remove(&content.id).unwrap_or_default(),
                    content,
                })
            })
            .collect()
    }

    async fn fetch_by_slug(&self, slug: &str) -> Result<Option<ContentRecord>, ContentError> {
        let row = sqlx::query_as::<_, ContentRow>(&format!(
            "SELECT {} FROM content WHERE slug = $1 AND published AND NOT archived",
            CONTENT_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let content = Content::try_from(row)?;
        let translations = self
            .load_translations(&[content.id])
            .await?
            .remove(&content.id)
            .unwrap_or_default();

        Ok(Some(ContentRecord {
            content,
            translations,
        }))
    }
}

#[async_trait]
impl ContentWriter for Database {
    async fn upsert_content(&self, draft: ContentDraft) -> Result<i64, ContentError> {
        let mut tx = self.pool.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO content (type, slug, published, archived, featured, sort_order, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, now()))
             ON CONFLICT (slug) DO UPDATE SET
                type = EXCLUDED.type,
                published = EXCLUDED.published,
                archived = EXCLUDED.archived,
                featured = EXCLUDED.featured,
                sort_order = EXCLUDED.sort_order,
                created_at = COALESCE($7, content.created_at),
                updated_at = now()
             RETURNING id",
        )
        .bind(draft.content_type.as_str())
        .bind(&draft.slug)
        .bind(draft.published)
        .bind(draft.archived)
        .bind(draft.featured)
        .bind(draft.sort_order)
        .bind(draft.created_at)
        .fetch_one(&mut *tx)
        .await?;

        for t in &draft.translations {
            sqlx::query(
                "INSERT INTO content_translations
                    (content_id, lang, title, subtitle, excerpt, body, meta_title, meta_description,
                     tags, intro, problem, solution, process, result, featured_image, gallery)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
                 ON CONFLICT (content_id, lang) DO UPDATE SET
                    title = EXCLUDED.title,
                    subtitle = EXCLUDED.subtitle,
                    excerpt = EXCLUDED.excerpt,
                    body = EXCLUDED.body,
                    meta_title = EXCLUDED.meta_title,
                    meta_description = EXCLUDED.meta_description,
                    tags = EXCLUDED.tags,
                    intro = EXCLUDED.intro,
                    problem = EXCLUDED.problem,
                    solution = EXCLUDED.solution,
                    process = EXCLUDED.process,
                    result = EXCLUDED.result,
                    featured_image = EXCLUDED.featured_image,
                    gallery = EXCLUDED.gallery",
            )
            .bind(id)
            .bind(&t.lang)
            .bind(&t.title)
            .bind(&t.subtitle)
            .bind(&t.excerpt)
            .bind(&t.body)
            .bind(&t.meta_title)
            .bind(&t.meta_description)
            .bind(&t.tags)
            .bind(&t.intro)
            .bind(&t.problem)
            .bind(&t.solution)
            .bind(&t.process)
            .bind(&t.result)
            .bind(&t.featured_image)
            .bind(&t.gallery)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(
            "Upserted {} '{}' with {} translation(s)",
            draft.content_type,
            draft.slug,
            draft.translations.len()
        );

        Ok(id)
    }
}

// ==================== Leads ====================

#[async_trait]
impl LeadStore for Database {
    async fn save_lead(&self, lead: &Lead) -> Result<i64> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO leads
                (kind, name, email, phone, company, website, project_type, project_type_other,
                 budget, deadline, message, service, locale, source_url, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING id",
        )
        .bind(lead.kind.as_str())
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(&lead.company)
        .bind(&lead.website)
        .bind(&lead.project_type)
        .bind(&lead.project_type_other)
        .bind(&lead.budget)
        .bind(&lead.deadline)
        .bind(&lead.message)
        .bind(&lead.service)
        .bind(lead.locale.code())
        .bind(&lead.source_url)
        .bind(lead.created_at)
        .fetch_one(&self.pool)
        .await
        .context("Failed to save lead")?;

        Ok(id)
    }
}

// ==================== Dead Letters ====================

#[async_trait]
impl DeadLetterSink for Database {
    async fn record(&self, letter: NewDeadLetter) -> Result<i64> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO notification_failures
                (kind, recipient, subject, html_body, text_body, reply_to, last_error, attempts,
                 permanent)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING id",
        )
        .bind(&letter.kind)
        .bind(&letter.email.to)
        .bind(&letter.email.subject)
        .bind(&letter.email.html)
        .bind(&letter.email.text)
        .bind(&letter.email.reply_to)
        .bind(&letter.last_error)
        .bind(letter.attempts)
        .bind(letter.permanent)
        .fetch_one(&self.pool)
        .await
        .context("Failed to record notification failure")?;

        Ok(id)
    }

    async fn pending(&self) -> Result<Vec<DeadLetter>> {
        let rows = sqlx::query_as::<_, DeadLetterRow>(
            "SELECT id, kind, recipient, subject, html_body, text_body, reply_to, last_error,
                    attempts, permanent, created_at, resolved_at
             FROM notification_failures
             WHERE resolved_at IS NULL
             ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list notification failures")?;

        Ok(rows.into_iter().map(DeadLetter::from).collect())
    }

    async fn mark_resolved(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE notification_failures SET resolved_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to resolve notification failure")?;
        Ok(())
    }

    async fn record_attempt(&self, id: i64, error: &str, permanent: bool) -> Result<()> {
        sqlx::query(
            "UPDATE notification_failures
             SET attempts = attempts + 1, last_error = $2, permanent = $3
             WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .bind(permanent)
        .execute(&self.pool)
        .await
        .context("Failed to update notification failure")?;
        Ok(())
    }
}
