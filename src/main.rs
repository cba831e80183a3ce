use anyhow::Result;
use clap::Parser;

use ragcompare::cli::{CheckTarget, Cli, Commands, Target};
use ragcompare::config::Config;
use ragcompare::logging::{init_early_logging, init_logging};
use ragcompare::metrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            init_early_logging();
            tracing::error!("Failed to load configuration: {:#}", e);
            return Err(e);
        }
    };

    // The guard MUST be held until program exit to ensure logs are flushed
    let base_dir = std::env::current_dir()?;
    let _logging_guard = init_logging(&config.logging, &base_dir)?;

    tracing::info!("ragcompare starting up");
    tracing::debug!("Loaded configuration from: {}", cli.config.display());

    metrics::register_metrics();

    match cli.command {
        Commands::Serve { host, port } => {
            ragcompare::commands::serve::run(&config, host, port).await?;
        }
        Commands::Index { target } => match target {
            Target::Solr => ragcompare::commands::index::run_solr(&config).await?,
            Target::Milvus => ragcompare::commands::index::run_milvus(&config).await?,
        },
        Commands::Check { target } => match target {
            CheckTarget::Milvus => ragcompare::commands::check::run_milvus(&config).await?,
        },
    }

    Ok(())
}
