use rust_decimal::Decimal;
use serde_json::json;

/// Natural key for a sheet row.
///
/// With a trade number the key is `trade#{no}:{asset}` and survives edits to
/// any other column. Without one it falls back to a JSON composite of asset,
/// type, entry and date; editing any of those yields a new identity and
/// therefore a new record.
pub fn resolve_identity(
    trade_no: &str,
    asset: &str,
    type_raw: &str,
    entry_price: Option<Decimal>,
    trade_date_raw: &str,
) -> String {
    let trade_no = trade_no.trim();
    let asset = asset.trim();

    if !trade_no.is_empty() && !asset.is_empty() {
        return format!("trade#{}:{}", trade_no, asset);
    }

    // fixed keys, no floats: the rendering is byte-stable across runs
    json!({
        "asset": asset,
        "type": type_raw.trim().to_uppercase(),
        "entry": entry_price.map(|p| p.normalize().to_string()),
        "trade_date": trade_date_raw.trim(),
    })
    .to_string()
}

pub fn is_fallback_identity(identity: &str) -> bool {
    !identity.starts_with("trade#")
}
