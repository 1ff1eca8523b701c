mod config;

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use log::{error, info, warn};

use config::{Config, PORTALS};
use valoranl_core::adapters::{SourceAdapter, StagingSqliteAdapter};
use valoranl_core::ingest::{
    CheckpointStore, FileCheckpointStore, IngestConfig, IngestService, RunSummary,
};
use valoranl_storage_sqlite::db;
use valoranl_storage_sqlite::ingest::ExecutionLogRepository;
use valoranl_storage_sqlite::listings::ListingRepository;
use valoranl_storage_sqlite::sources::SourceRepository;

/// Unifies property listings scraped from independent portals into one
/// deduplicated, change-tracked canonical store.
#[derive(Parser, Debug)]
#[command(name = "valoranl", version, about)]
struct Cli {
    /// Ignore an existing checkpoint and run strictly: the first source
    /// failure aborts the whole run.
    #[arg(long)]
    no_resume: bool,

    /// Days without a sighting before an active listing is deactivated.
    /// 0 disables the stale sweep.
    #[arg(long, default_value_t = 30)]
    stale_days: u32,

    /// Delete the checkpoint before running.
    #[arg(long)]
    reset: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let checkpoints = FileCheckpointStore::new(&config.checkpoint_file);
    if cli.reset {
        checkpoints.clear()?;
        info!("checkpoint reset");
    }

    // Store unreachable at startup is fatal.
    let db_path = db::init(&config.database_path)?;
    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let adapters: Vec<Arc<dyn SourceAdapter>> = PORTALS
        .iter()
        .map(|portal| {
            Arc::new(StagingSqliteAdapter::new(
                portal.code,
                portal.name,
                Some(portal.base_url.to_string()),
                config.staging_dir.join(portal.db_file),
            )) as Arc<dyn SourceAdapter>
        })
        .collect();

    let ingest_config = IngestConfig {
        max_retries: config.max_retries,
        retry_delay_base_secs: config.retry_delay_base_secs,
        stale_days: cli.stale_days,
        scrape_timeout: config.scrape_timeout,
        resume: !cli.no_resume,
    };

    let cancelled = Arc::new(AtomicBool::new(false));
    {
        let cancelled = cancelled.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("termination requested, finishing current source");
                cancelled.store(true, Ordering::SeqCst);
            }
        });
    }

    let service = IngestService::new(
        adapters,
        Arc::new(ListingRepository::new(pool.clone(), writer.clone())),
        Arc::new(SourceRepository::new(pool.clone(), writer.clone())),
        Arc::new(ExecutionLogRepository::new(writer.clone())),
        Box::new(checkpoints),
        ingest_config,
        cancelled,
    );

    match service.run().await {
        Ok(summary) => {
            print_summary(&summary);
            if summary.exit_ok() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Err(e) => {
            error!("run failed: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!("\n=== EXECUTION SUMMARY ===");
    println!("id:        {}", summary.execution_id);
    println!("status:    {}", summary.status.as_str());
    println!("sources:   {}", summary.sources_processed);
    println!("read:      {}", summary.total_read);
    println!("inserted:  {}", summary.new_listings);
    println!("updated:   {}", summary.updated_listings);
    if summary.deactivated > 0 {
        println!("stale:     {} deactivated", summary.deactivated);
    }

    for (code, metrics) in &summary.by_source {
        println!(
            "  {:<12} read={:<5} inserted={:<5} updated={:<5} skipped_price={:<4} errors={:<4} warnings={:<4}",
            code,
            metrics.read,
            metrics.inserted,
            metrics.updated,
            metrics.skipped_price,
            metrics.errors,
            metrics.warnings
        );
    }

    if !summary.failed_sources.is_empty() {
        println!("failed sources:");
        for (code, reason) in &summary.failed_sources {
            println!("  {}: {}", code, reason);
        }
    }
}
