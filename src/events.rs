use serde::{Deserialize, Serialize};

use crate::data::types::Signal;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    New,
    Updated,
    Unchanged,
}

/// What reconciling a single row did to the store.
#[derive(Clone, Debug)]
pub enum ReconcileOutcome {
    New(Signal),
    Updated { before: Signal, after: Signal },
    Unchanged(Signal),
}

impl ReconcileOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            ReconcileOutcome::New(_) => OutcomeKind::New,
            ReconcileOutcome::Updated { .. } => OutcomeKind::Updated,
            ReconcileOutcome::Unchanged(_) => OutcomeKind::Unchanged,
        }
    }

    /// NEW and UPDATED count as processed; UNCHANGED does not.
    pub fn is_change(&self) -> bool {
        !matches!(self, ReconcileOutcome::Unchanged(_))
    }

    pub fn signal(&self) -> &Signal {
        match self {
            ReconcileOutcome::New(s) => s,
            ReconcileOutcome::Updated { after, .. } => after,
            ReconcileOutcome::Unchanged(s) => s,
        }
    }
}

/// Result of one `run_once` trigger.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub ok: bool,
    /// NEW + UPDATED rows
    pub processed: usize,
    pub unchanged: usize,
    /// Rows dropped for lacking an asset
    pub skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab: Option<String>,
}

impl RunResult {
    pub fn success(tab: &str) -> Self {
        Self {
            ok: true,
            tab: Some(tab.to_string()),
            ..Default::default()
        }
    }

    /// Successful run that had nothing to reconcile.
    pub fn nothing_to_do(reason: &str, tab: &str) -> Self {
        Self {
            reason: Some(reason.to_string()),
            ..Self::success(tab)
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            ok: false,
            error: Some(error),
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: &ReconcileOutcome) {
        if outcome.is_change() {
            self.processed += 1;
        } else {
            self.unchanged += 1;
        }
    }
}
