use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::constants::reasons;
use crate::data::traits::{AuditSink, SignalStore};
use crate::data::types::AuditAction;
use crate::error::MonitorError;
use crate::events::RunResult;
use crate::notify::{message, Notifier};
use crate::sheet::grid::{is_blank_row, parse_grid};
use crate::sheet::header::locate_header;
use crate::sheet::identity::is_fallback_identity;
use crate::sheet::normalize::normalize_row;
use crate::sheet::source::TabularSource;

use super::reconciler::Reconciler;

/// Fetch -> parse -> locate header -> normalize -> reconcile, for one sheet.
///
/// Runs are single-flight: a trigger that arrives while a run is in progress
/// waits for it to finish instead of racing it on the same identities.
pub struct SheetMonitor {
    source: Arc<dyn TabularSource>,
    reconciler: Reconciler,
    required_headers: Vec<String>,
    tab: String,
    run_lock: Mutex<()>,
}

impl SheetMonitor {
    pub fn new(
        config: &AppConfig,
        source: Arc<dyn TabularSource>,
        store: Arc<dyn SignalStore>,
        audit: Arc<dyn AuditSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        info!(
            "🗂️ [MONITOR] Reconciling into the {} store, notifying via {}",
            store.name(),
            notifier.name()
        );
        let reconciler = Reconciler::new(
            store,
            audit,
            notifier,
            Duration::from_secs(config.store.op_timeout_secs),
        );

        Self {
            source,
            reconciler,
            required_headers: config.sheet.required_headers.clone(),
            tab: config.sheet.tab.clone(),
            run_lock: Mutex::new(()),
        }
    }

    /// Run the pipeline once. Either every row is reconciled, or the run
    /// aborts at the first fetch/store failure and the failure is reported
    /// to the audit log and the notifier.
    pub async fn run_once(&self) -> RunResult {
        let _guard = self.run_lock.lock().await;
        let started = Instant::now();
        info!("🔄 [MONITOR] Sync started for {}", self.source.describe());

        match self.run_inner().await {
            Ok(result) => {
                info!(
                    "✅ [MONITOR] Sync finished in {:?}: processed={} unchanged={} skipped={}{}",
                    started.elapsed(),
                    result.processed,
                    result.unchanged,
                    result.skipped,
                    result
                        .reason
                        .as_deref()
                        .map(|r| format!(" reason={}", r))
                        .unwrap_or_default()
                );
                result
            }
            Err(e) => {
                let reason = e.to_string();
                error!("❌ [MONITOR] Sync aborted after {:?}: {}", started.elapsed(), reason);

                self.reconciler
                    .record(AuditAction::Error, None, json!({ "error": reason }))
                    .await;
                self.reconciler.announce(&message::run_failed(&reason)).await;

                RunResult::failed(reason)
            }
        }
    }

    async fn run_inner(&self) -> Result<RunResult, MonitorError> {
        let raw = self.source.fetch().await?;

        let grid = match parse_grid(&raw) {
            Ok(grid) => grid,
            Err(e) => {
                warn!("⚠️ [MONITOR] Sheet export is not parseable yet: {}", e);
                return Ok(RunResult::nothing_to_do(reasons::PARSE_FAILED, &self.tab));
            }
        };

        if grid.len() < 2 {
            return Ok(RunResult::nothing_to_do(reasons::TOO_FEW_ROWS, &self.tab));
        }

        let Some(header_index) = locate_header(&grid, &self.required_headers) else {
            warn!(
                "⚠️ [MONITOR] No header row with {:?} found in {} rows",
                self.required_headers,
                grid.len()
            );
            return Ok(RunResult::nothing_to_do(reasons::HEADER_NOT_FOUND, &self.tab));
        };

        let header = &grid[header_index];
        let mut result = RunResult::success(&self.tab);

        let mut seen = HashSet::new();
        for row in grid[header_index + 1..].iter().filter(|r| !is_blank_row(r)) {
            let Some(draft) = normalize_row(header, row) else {
                result.skipped += 1;
                continue;
            };

            if is_fallback_identity(&draft.identity) {
                debug!(
                    "[MONITOR] {} has no trade number, keyed by content: {}",
                    draft.asset, draft.identity
                );
            }
            if !seen.insert(draft.identity.clone()) {
                // Both rows write the same record, so every run flips it back and forth
                warn!(
                    "⚠️ [MONITOR] Identity {} appears more than once in the sheet; the later row overwrites the earlier",
                    draft.identity
                );
            }

            let outcome = self.reconciler.reconcile(draft).await?;
            result.record(&outcome);
        }

        Ok(result)
    }
}
