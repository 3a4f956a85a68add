use anyhow::Context;
use swift_ingest::{database, Config, ImportOrchestrator};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("🚀 {} v{} starting", swift_ingest::SERVICE_NAME, swift_ingest::VERSION);

    let config = Config::from_env().context("failed to load configuration")?;
    config
        .folders
        .ensure_exists()
        .context("staging folders unavailable")?;

    let pool = database::create_pool(&config.database)
        .await
        .context("database unavailable")?;

    let orchestrator = ImportOrchestrator::new(config.folders, pool);
    let summary = orchestrator.run_pass().await.context("import pass failed")?;

    info!(
        imported = summary.imported,
        skipped = summary.skipped,
        errored = summary.errored,
        "Done"
    );

    Ok(())
}
