use std::io::Write;
use std::path::PathBuf;
#[cfg(test)]
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StoreError;

use super::traits::{AuditSink, StoreResult};
use super::types::{AuditEntry, AuditEvent};

/// Keeps audit events in memory. Used by tests and dry runs.
#[derive(Clone, Debug, Default)]
pub struct MemoryAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn append(&self, entry: AuditEntry) -> StoreResult<AuditEvent> {
        let event = AuditEvent::stamp(entry, Utc::now());
        self.events
            .lock()
            .map_err(|_| StoreError::Backend("audit log lock poisoned".to_string()))?
            .push(event.clone());
        Ok(event)
    }
}

/// Appends one JSON object per line. Existing lines are never rewritten.
#[derive(Clone, Debug)]
pub struct JsonlAuditSink {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonlAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    #[cfg(test)]
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AuditSink for JsonlAuditSink {
    async fn append(&self, entry: AuditEntry) -> StoreResult<AuditEvent> {
        let event = AuditEvent::stamp(entry, Utc::now());
        let line = serde_json::to_string(&event)?;

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Backend("audit log lock poisoned".to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(f, "{}", line)?;

        Ok(event)
    }
}
