use anyhow::Result;
use ario_studio::{
    config::Config,
    content::{ContentQuery, ContentSource, MemoryContentStore},
    db::Database,
    email::{DeadLetterSink, JsonlDeadLetterLog, Notifier},
    lead::LeadStore,
    routes::{create_app, AppState},
    scheduler,
};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ario_studio=info".parse()?),
        )
        .init();

    info!("Starting Ario Studio API");

    let config = Arc::new(Config::from_env()?);

    // Database is optional: without it content is empty and leads are not stored
    let database = match &config.database_url {
        Some(url) => match connect(url).await {
            Ok(db) => Some(db),
            Err(e) => {
                warn!("Database unavailable, continuing without persistence: {:#}", e);
                None
            }
        },
        None => {
            info!("DATABASE_URL not set, running without persistence");
            None
        }
    };

    let (content_source, leads, dead_letters): (
        Arc<dyn ContentSource>,
        Option<Arc<dyn LeadStore>>,
        Arc<dyn DeadLetterSink>,
    ) = match database {
        Some(db) => {
            let db = Arc::new(db);
            let leads: Arc<dyn LeadStore> = db.clone();
            (db.clone(), Some(leads), db)
        }
        None => (
            Arc::new(MemoryContentStore::new()),
            None,
            Arc::new(JsonlDeadLetterLog::new(&config.dead_letter_path)),
        ),
    };

    let notifier = Arc::new(Notifier::from_config(&config, dead_letters.clone()));
    if notifier.delivers() {
        info!(
            "✓ SMTP delivery enabled for {} recipient(s)",
            notifier.recipients().len()
        );
    } else {
        warn!("SMTP not configured, notifications will only be logged");
    }

    // Keep the scheduler alive for the lifetime of the server
    let _scheduler =
        match scheduler::start_scheduler(&config.notification_retry_schedule, notifier.clone())
            .await
        {
            Ok(s) => Some(s),
            Err(e) => {
                warn!("Notification redelivery scheduler not started: {:#}", e);
                None
            }
        };

    let state = AppState {
        config: config.clone(),
        content: ContentQuery::new(content_source),
        notifier,
        leads,
        dead_letters,
    };

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("✓ Listening on {}", addr);

    axum::serve(listener, create_app(state)).await?;

    Ok(())
}

async fn connect(url: &str) -> Result<Database> {
    let db = Database::connect(url).await?;
    db.run_migrations().await?;
    info!("✓ Database connected and migrated");
    Ok(db)
}
