use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;

use super::types::{AuditEntry, AuditEvent, Signal, SignalDraft};

pub type StoreResult<T> = Result<T, StoreError>;

/// Persisted signal records keyed by identity.
///
/// Writes are conditional so that two overlapping runs cannot both insert the
/// same identity, and an update based on a stale read is rejected with
/// [`StoreError::Conflict`] instead of silently overwriting.
#[async_trait]
pub trait SignalStore: Send + Sync {
    fn name(&self) -> &'static str;

    async fn find_by_identity(&self, identity: &str) -> StoreResult<Option<Signal>>;

    /// Insert-if-absent. Fails with `Conflict` when the identity already exists.
    async fn insert(&self, draft: SignalDraft) -> StoreResult<Signal>;

    /// Update-if-version-matches.
    async fn update(&self, id: Uuid, expected_version: u64, draft: SignalDraft) -> StoreResult<Signal>;

    /// Newest `updated_at` first.
    async fn list(&self) -> StoreResult<Vec<Signal>>;
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, entry: AuditEntry) -> StoreResult<AuditEvent>;
}
