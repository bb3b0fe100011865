//! One-shot import of projects, services and blog posts from the visual CMS
//! into the content tables.
//!
//! Usage: cargo run --bin import-cms
//!
//! Requires SANITY_PROJECT_ID and DATABASE_URL. Safe to re-run: items are
//! upserted by slug.

use anyhow::{bail, Context, Result};
use ario_studio::{cms, config::Config, db::Database};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ario_studio=info".parse()?)
                .add_directive("import_cms=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;

    let Some(cms_config) = config.cms.clone() else {
        bail!("SANITY_PROJECT_ID must be set to import from the CMS");
    };
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set to import from the CMS")?;

    let db = Database::connect(database_url).await?;
    db.run_migrations().await?;

    info!(
        "Importing from CMS project '{}' (dataset '{}')",
        cms_config.project_id, cms_config.dataset
    );

    let client = cms::SanityClient::new(cms_config);
    let report = cms::import_all(&client, &db).await?;

    println!();
    println!("Imported: {}", report.imported);
    println!("Skipped:  {}", report.skipped);
    println!("Failed:   {}", report.failed);

    if report.failed > 0 {
        bail!("{} document(s) failed to import", report.failed);
    }

    Ok(())
}
