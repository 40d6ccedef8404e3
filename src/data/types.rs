use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized sheet row, not yet persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignalDraft {
    pub identity: String,
    pub trade_date: Option<NaiveDate>,
    pub asset: String,
    pub side: Side,
    pub entry_price: Option<Decimal>,
    pub target_price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub weight: Option<Decimal>,
    pub status: String,
    pub notes: String,
}

/// A persisted trade instruction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: Uuid,
    pub identity: String,
    pub trade_date: Option<NaiveDate>,
    pub asset: String,
    pub side: Side,
    pub entry_price: Option<Decimal>,
    pub target_price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub weight: Option<Decimal>,
    pub status: String,
    pub notes: String,
    /// Bumped on every update; conditional writes compare against it.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Audit rendering of a [`Signal`] with prices as JSON numbers.
///
/// Serialize-only: persisted records keep exact decimal strings, so the float
/// conversion never feeds back into change detection.
#[derive(Debug, Serialize)]
pub struct SignalDetails<'a> {
    pub id: Uuid,
    pub identity: &'a str,
    pub trade_date: Option<NaiveDate>,
    pub asset: &'a str,
    pub side: Side,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub entry_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub target_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub stop_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub weight: Option<Decimal>,
    pub status: &'a str,
    pub notes: &'a str,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Signal {
    /// Build a fresh record from a draft. The store assigns id and timestamps.
    pub fn from_draft(draft: SignalDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity: draft.identity,
            trade_date: draft.trade_date,
            asset: draft.asset,
            side: draft.side,
            entry_price: draft.entry_price,
            target_price: draft.target_price,
            stop_price: draft.stop_price,
            weight: draft.weight,
            status: draft.status,
            notes: draft.notes,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn details(&self) -> SignalDetails<'_> {
        SignalDetails {
            id: self.id,
            identity: &self.identity,
            trade_date: self.trade_date,
            asset: &self.asset,
            side: self.side,
            entry_price: self.entry_price,
            target_price: self.target_price,
            stop_price: self.stop_price,
            weight: self.weight,
            status: &self.status,
            notes: &self.notes,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Overwrite the mutable fields with a newer sighting of the same row.
    /// `identity`, `id` and `created_at` never change.
    pub fn apply(&mut self, draft: SignalDraft, now: DateTime<Utc>) {
        self.trade_date = draft.trade_date;
        self.asset = draft.asset;
        self.side = draft.side;
        self.entry_price = draft.entry_price;
        self.target_price = draft.target_price;
        self.stop_price = draft.stop_price;
        self.weight = draft.weight;
        self.status = draft.status;
        self.notes = draft.notes;
        self.version += 1;
        self.updated_at = now;
    }

    /// Names of the comparable fields that differ from `draft`.
    /// Strict equality on numbers, no tolerance.
    pub fn changed_fields(&self, draft: &SignalDraft) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if self.side != draft.side {
            changed.push("side");
        }
        if self.entry_price != draft.entry_price {
            changed.push("entry_price");
        }
        if self.target_price != draft.target_price {
            changed.push("target_price");
        }
        if self.stop_price != draft.stop_price {
            changed.push("stop_price");
        }
        if self.weight != draft.weight {
            changed.push("weight");
        }
        if self.status != draft.status {
            changed.push("status");
        }
        if self.notes != draft.notes {
            changed.push("notes");
        }
        changed
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    NewSignal,
    UpdateSignal,
    Error,
}

/// An audit record before the sink stamps it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditEntry {
    pub scope: String,
    pub action: AuditAction,
    pub ref_id: Option<Uuid>,
    pub details: Value,
}

/// Append-only audit record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub scope: String,
    pub action: AuditAction,
    pub ref_id: Option<Uuid>,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn stamp(entry: AuditEntry, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            scope: entry.scope,
            action: entry.action,
            ref_id: entry.ref_id,
            details: entry.details,
            created_at: now,
        }
    }
}
