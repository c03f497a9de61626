use anyhow::Result;
use memefetch::{
    blobs::FsBlobStore,
    config::Config,
    repositories::PgMemeStore,
    scraper::{DuplicateReconciler, ScrapeConfig, ScrapeDriver},
    source::HttpMemeSource,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration; malformed values fail fast before any loop starts
    let config = Config::from_env()?;

    // Create database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(config.database_url())
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    let store = PgMemeStore::new(pool);
    let blobs = FsBlobStore::create(config.uploads_dir()).await?;
    let source = HttpMemeSource::new(config.meme_api_base().clone());

    // Clean up fingerprint duplicates before pulling anything new
    let reconciler = DuplicateReconciler::new(&store, &blobs);
    let removed = reconciler.run().await?;
    info!(removed, "pre-pass reconciliation done");

    let scrape_config = ScrapeConfig {
        target_accepted: config.scrape_target(),
        max_attempts: config.scrape_max_attempts(),
        batch_size: config.scrape_batch_size(),
        cooldown: config.scrape_cooldown(),
        owner_id: config.scraper_identity(),
    };

    let driver = ScrapeDriver::new(&source, &store, &blobs, scrape_config.clone());
    let mut rng = StdRng::from_entropy();
    let report = driver.run(&mut rng).await;

    info!(
        accepted = report.accepted,
        target = scrape_config.target_accepted,
        attempts = report.attempts,
        failed_batches = report.failed_batches,
        skipped_nsfw = report.skipped_nsfw,
        skipped_duplicate = report.skipped_duplicate,
        skipped_download = report.skipped_download,
        store_errors = report.store_errors,
        reached_target = report.reached_target(&scrape_config),
        "scrape run complete"
    );

    Ok(())
}
