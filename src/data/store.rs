use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::StoreError;

use super::traits::{SignalStore, StoreResult};
use super::types::{Signal, SignalDraft};

/// In-memory signal store with an optional JSON snapshot on disk.
///
/// The snapshot is rewritten after every mutation so a restarted process
/// resumes from the last reconciled state instead of re-announcing every row.
#[derive(Clone, Debug)]
pub struct MemorySignalStore {
    by_identity: Arc<DashMap<String, Signal>>,
    identity_by_id: Arc<DashMap<Uuid, String>>,
    snapshot_path: Option<PathBuf>,
    flush_lock: Arc<Mutex<()>>,
}

impl Default for MemorySignalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySignalStore {
    pub fn new() -> Self {
        Self {
            by_identity: Arc::new(DashMap::new()),
            identity_by_id: Arc::new(DashMap::new()),
            snapshot_path: None,
            flush_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Load `path` if it exists and keep flushing to it.
    pub fn with_snapshot(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let mut store = Self::new();

        if path.exists() {
            let raw = std::fs::read(&path)?;
            let signals: Vec<Signal> = serde_json::from_slice(&raw)?;
            info!(
                "💾 [STORE] Loaded {} signals from {}",
                signals.len(),
                path.display()
            );
            for signal in signals {
                store.identity_by_id.insert(signal.id, signal.identity.clone());
                store.by_identity.insert(signal.identity.clone(), signal);
            }
        }

        store.snapshot_path = Some(path);
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.by_identity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identity.is_empty()
    }

    fn snapshot(&self) -> Vec<Signal> {
        let mut signals: Vec<Signal> = self
            .by_identity
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        signals.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        signals
    }

    /// Must not be called while holding a map guard.
    fn flush(&self) -> StoreResult<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        let _guard = self
            .flush_lock
            .lock()
            .map_err(|_| StoreError::Backend("snapshot lock poisoned".to_string()))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp = tmp_path(path);
        std::fs::write(&tmp, serde_json::to_vec_pretty(&self.snapshot())?)?;
        std::fs::rename(&tmp, path)?;
        debug!("💾 [STORE] Snapshot flushed to {}", path.display());
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[async_trait]
impl SignalStore for MemorySignalStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn find_by_identity(&self, identity: &str) -> StoreResult<Option<Signal>> {
        Ok(self.by_identity.get(identity).map(|s| s.value().clone()))
    }

    async fn insert(&self, draft: SignalDraft) -> StoreResult<Signal> {
        let inserted = match self.by_identity.entry(draft.identity.clone()) {
            Entry::Occupied(_) => {
                return Err(StoreError::Conflict {
                    key: draft.identity,
                })
            }
            Entry::Vacant(slot) => {
                let signal = Signal::from_draft(draft, Utc::now());
                slot.insert(signal.clone());
                signal
            }
        };
        self.identity_by_id
            .insert(inserted.id, inserted.identity.clone());

        if let Err(e) = self.flush() {
            // Not durable, so not inserted: the next run must see it as new again
            self.by_identity
                .remove_if(&inserted.identity, |_, s| s.id == inserted.id && s.version == 1);
            self.identity_by_id.remove(&inserted.id);
            warn!("⚠️ [STORE] Insert of {} rolled back: {}", inserted.identity, e);
            return Err(e);
        }
        Ok(inserted)
    }

    async fn update(&self, id: Uuid, expected_version: u64, draft: SignalDraft) -> StoreResult<Signal> {
        let identity = self
            .identity_by_id
            .get(&id)
            .map(|i| i.value().clone())
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        if draft.identity != identity {
            return Err(StoreError::Backend(format!(
                "identity is immutable: {} cannot become {}",
                identity, draft.identity
            )));
        }

        let (previous, updated) = {
            let mut current = self
                .by_identity
                .get_mut(&identity)
                .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

            if current.version != expected_version {
                return Err(StoreError::Conflict { key: identity });
            }
            let previous = current.clone();
            current.apply(draft, Utc::now());
            (previous, current.clone())
        };

        if let Err(e) = self.flush() {
            if let Some(mut current) = self.by_identity.get_mut(&identity) {
                if current.version == updated.version {
                    *current = previous;
                }
            }
            warn!("⚠️ [STORE] Update of {} rolled back: {}", identity, e);
            return Err(e);
        }
        Ok(updated)
    }

    async fn list(&self) -> StoreResult<Vec<Signal>> {
        Ok(self.snapshot())
    }
}
