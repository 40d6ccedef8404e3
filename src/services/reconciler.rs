use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::constants::audit::SCOPE_SHEET;
use crate::data::traits::{AuditSink, SignalStore, StoreResult};
use crate::data::types::{AuditAction, AuditEntry, Signal, SignalDraft};
use crate::error::StoreError;
use crate::events::ReconcileOutcome;
use crate::notify::{message, Notifier};

/// Lookup-compare-write for one normalized row, plus the notification and
/// audit record that go with each change.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn SignalStore>,
    audit: Arc<dyn AuditSink>,
    notifier: Arc<dyn Notifier>,
    op_timeout: Duration,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn SignalStore>,
        audit: Arc<dyn AuditSink>,
        notifier: Arc<dyn Notifier>,
        op_timeout: Duration,
    ) -> Self {
        Self {
            store,
            audit,
            notifier,
            op_timeout,
        }
    }

    /// Reconcile one row. A lost conditional write means another writer got
    /// there between our read and write; the cycle is repeated once against
    /// the fresh state before giving up.
    pub async fn reconcile(&self, draft: SignalDraft) -> Result<ReconcileOutcome, StoreError> {
        match self.reconcile_once(draft.clone()).await {
            Err(StoreError::Conflict { key }) => {
                warn!("⚠️ [RECONCILE] Write conflict on {}, retrying against fresh state", key);
                self.reconcile_once(draft).await
            }
            other => other,
        }
    }

    async fn reconcile_once(&self, draft: SignalDraft) -> Result<ReconcileOutcome, StoreError> {
        let existing = self
            .bounded("find_by_identity", self.store.find_by_identity(&draft.identity))
            .await?;

        let Some(current) = existing else {
            let created = self.bounded("insert", self.store.insert(draft)).await?;
            info!(
                "🆕 [RECONCILE] New signal {} {} ({})",
                created.side, created.asset, created.identity
            );

            self.announce(&message::new_trade(&created)).await;
            self.record(AuditAction::NewSignal, Some(created.id), to_details(&created))
                .await;
            return Ok(ReconcileOutcome::New(created));
        };

        let changed = current.changed_fields(&draft);
        if changed.is_empty() {
            debug!("[RECONCILE] Unchanged: {}", current.identity);
            return Ok(ReconcileOutcome::Unchanged(current));
        }

        let updated = self
            .bounded(
                "update",
                self.store.update(current.id, current.version, draft),
            )
            .await?;
        info!(
            "✏️ [RECONCILE] Updated signal {} {} ({}) fields={:?}",
            updated.side, updated.asset, updated.identity, changed
        );

        self.announce(&message::updated_trade(&updated)).await;
        self.record(
            AuditAction::UpdateSignal,
            Some(updated.id),
            json!({ "before": to_details(&current), "after": to_details(&updated) }),
        )
        .await;

        Ok(ReconcileOutcome::Updated {
            before: current,
            after: updated,
        })
    }

    /// Best-effort: a failed notification is logged and dropped.
    pub async fn announce(&self, text: &str) {
        if let Err(e) = self.notifier.send(text).await {
            warn!("⚠️ [NOTIFY] {} delivery failed: {}", self.notifier.name(), e);
        }
    }

    /// Best-effort: the store write already happened, so an audit failure is
    /// logged rather than aborting the run.
    pub async fn record(&self, action: AuditAction, ref_id: Option<Uuid>, details: Value) {
        let entry = AuditEntry {
            scope: SCOPE_SHEET.to_string(),
            action,
            ref_id,
            details,
        };
        if let Err(e) = self.bounded("audit_append", self.audit.append(entry)).await {
            warn!("⚠️ [AUDIT] Failed to append {:?} event: {}", action, e);
        }
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        tokio::time::timeout(self.op_timeout, fut)
            .await
            .map_err(|_| StoreError::Timeout {
                op,
                secs: self.op_timeout.as_secs(),
            })?
    }
}

fn to_details(signal: &Signal) -> Value {
    serde_json::to_value(signal.details()).unwrap_or_else(|e| json!({ "serialization_error": e.to_string() }))
}
