//! Row normalization: header labels + raw cells -> `SignalDraft`.
//!
//! Everything here is pure so the alias table and numeric cleanup can be
//! tested without a store or network.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::data::types::{Side, SignalDraft};

use super::identity::resolve_identity;

/// Canonical fields a sheet column can feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Asset,
    Type,
    EntryPrice,
    TargetPrice,
    StopPrice,
    Weight,
    Status,
    Notes,
    TradeNo,
    TradeDate,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 10] = [
        CanonicalField::Asset,
        CanonicalField::Type,
        CanonicalField::EntryPrice,
        CanonicalField::TargetPrice,
        CanonicalField::StopPrice,
        CanonicalField::Weight,
        CanonicalField::Status,
        CanonicalField::Notes,
        CanonicalField::TradeNo,
        CanonicalField::TradeDate,
    ];

    /// Normalized header labels in priority order.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            CanonicalField::Asset => &["asset", "coin", "ticker"],
            CanonicalField::Type => &["type"],
            CanonicalField::EntryPrice => &["price_at_trade", "entry", "entry_price", "price"],
            CanonicalField::TargetPrice => &["target", "exit_$", "exit_price"],
            CanonicalField::StopPrice => &["stop", "stop_loss", "stop_loss_/_strike", "sl"],
            CanonicalField::Weight => &[
                "weight",
                "allocation",
                "trade_size",
                "capital_locked",
                "size",
            ],
            CanonicalField::Status => &["status", "state"],
            CanonicalField::Notes => &["notes"],
            CanonicalField::TradeNo => &["trade_no.", "trade_no"],
            CanonicalField::TradeDate => &["date", "trade_date"],
        }
    }
}

/// Lower-case and join whitespace runs with `_` ("Price at Trade" -> "price_at_trade").
pub fn normalize_label(label: &str) -> String {
    label
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// One data row keyed by normalized header label.
#[derive(Clone, Debug, Default)]
pub struct LabeledRow {
    cells: HashMap<String, String>,
}

impl LabeledRow {
    /// Cells past the end of a short row read as empty. For duplicate labels
    /// the rightmost column wins.
    pub fn new(header: &[String], row: &[String]) -> Self {
        let cells = header
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let cell = row.get(i).map(|c| c.trim().to_string()).unwrap_or_default();
                (normalize_label(label), cell)
            })
            .collect();
        Self { cells }
    }

    /// First alias with a non-empty value, or "".
    pub fn resolve(&self, field: CanonicalField) -> &str {
        field
            .aliases()
            .iter()
            .filter_map(|alias| self.cells.get(*alias))
            .find(|value| !value.is_empty())
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Side from the free-text type column. Anything ambiguous is a buy.
pub fn derive_side(type_raw: &str) -> Side {
    let folded = type_raw.to_lowercase();
    if folded.contains("sell") {
        Side::Sell
    } else {
        Side::Buy
    }
}

const STRIPPED_CHARS: [char; 6] = ['$', ',', '"', '€', '£', '¥'];

/// Clean a money-ish cell and parse it. Unparseable or negative input is
/// absent, never zero.
pub fn sanitize_number(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !STRIPPED_CHARS.contains(c))
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let value = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()?;

    if value.is_sign_negative() && !value.is_zero() {
        return None;
    }
    Some(value)
}

const DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d-%m-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%d-%b-%Y",
];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M:%S"];

/// Best-effort date from the formats sheets commonly emit.
pub fn parse_trade_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for format in DATE_FORMATS.iter() {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS.iter() {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts.date());
        }
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|ts| ts.date_naive())
}

/// Normalize one data row. Rows without an asset are dropped (`None`).
pub fn normalize_row(header: &[String], row: &[String]) -> Option<SignalDraft> {
    let labeled = LabeledRow::new(header, row);

    let asset = labeled.resolve(CanonicalField::Asset);
    if asset.is_empty() {
        return None;
    }

    let type_raw = labeled.resolve(CanonicalField::Type);
    let entry_price = sanitize_number(labeled.resolve(CanonicalField::EntryPrice));
    let trade_date_raw = labeled.resolve(CanonicalField::TradeDate);

    let identity = resolve_identity(
        labeled.resolve(CanonicalField::TradeNo),
        asset,
        type_raw,
        entry_price,
        trade_date_raw,
    );

    Some(SignalDraft {
        identity,
        trade_date: parse_trade_date(trade_date_raw),
        asset: asset.to_string(),
        side: derive_side(type_raw),
        entry_price,
        target_price: sanitize_number(labeled.resolve(CanonicalField::TargetPrice)),
        stop_price: sanitize_number(labeled.resolve(CanonicalField::StopPrice)),
        weight: sanitize_number(labeled.resolve(CanonicalField::Weight)),
        status: labeled.resolve(CanonicalField::Status).to_string(),
        notes: labeled.resolve(CanonicalField::Notes).to_string(),
    })
}
