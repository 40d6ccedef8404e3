use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use sheet_signal_sync::config::AppConfig;
use sheet_signal_sync::constants::defaults;
use sheet_signal_sync::data::audit::{JsonlAuditSink, MemoryAuditSink};
use sheet_signal_sync::data::store::MemorySignalStore;
use sheet_signal_sync::data::traits::{AuditSink, SignalStore};
use sheet_signal_sync::logger::setup_logger;
use sheet_signal_sync::notify::factory::build_notifier;
use sheet_signal_sync::services::monitor::SheetMonitor;
use sheet_signal_sync::services::scheduler::SyncScheduler;
use sheet_signal_sync::sheet::source::HttpSheetSource;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(about = "Reconcile trade signals from a shared spreadsheet")]
struct Args {
    /// YAML config file; a missing file means environment-only configuration
    #[arg(short, long, default_value = defaults::CONFIG_PATH)]
    config: PathBuf,

    /// Run one sync, print the result as JSON and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();
    setup_logger();

    info!("Starting Sheet Signal Sync...");

    let config = AppConfig::load(&args.config)?;
    info!("Loaded Configuration: {:?}", config);

    let store: Arc<dyn SignalStore> = match &config.store.snapshot_path {
        Some(path) => {
            let store = MemorySignalStore::with_snapshot(path)?;
            info!("💾 [STORE] {} signals loaded from {}", store.len(), path.display());
            Arc::new(store)
        }
        None => {
            warn!("⚠️ [STORE] No snapshot_path configured - signals are kept in memory only");
            Arc::new(MemorySignalStore::new())
        }
    };

    let audit: Arc<dyn AuditSink> = match &config.store.audit_log_path {
        Some(path) => Arc::new(JsonlAuditSink::new(path.clone())),
        None => Arc::new(MemoryAuditSink::new()),
    };

    let notifier = build_notifier(&config);
    let source = Arc::new(HttpSheetSource::new(
        &config.sheet.url,
        Duration::from_secs(config.sheet.fetch_timeout_secs),
    )?);

    let monitor = Arc::new(SheetMonitor::new(&config, source, store, audit, notifier));

    let schedule = match (&config.schedule, args.once) {
        (Some(schedule), false) => schedule.clone(),
        _ => {
            let result = monitor.run_once().await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.ok {
                std::process::exit(1);
            }
            return Ok(());
        }
    };

    // First sync right away so a restart does not wait for the next tick
    let result = monitor.run_once().await;
    if !result.ok {
        warn!("⚠️ Initial sync failed: {}", result.error.unwrap_or_default());
    }

    let mut scheduler = SyncScheduler::new(monitor.clone()).start(&schedule).await?;

    tokio::signal::ctrl_c().await?;
    info!("🛑 Shutdown requested, stopping scheduler...");
    scheduler.shutdown().await?;

    Ok(())
}
