use rust_decimal::Decimal;

use crate::data::types::Signal;

fn shown(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| !v.is_zero()).map(|v| v.normalize())
}

/// `{prefix}: {SIDE} {asset}[ @ entry][ | Target target]`
fn trade_line(prefix: &str, signal: &Signal) -> String {
    let mut text = format!("{}: {} {}", prefix, signal.side, signal.asset);
    if let Some(entry) = shown(signal.entry_price) {
        text.push_str(&format!(" @ {}", entry));
    }
    if let Some(target) = shown(signal.target_price) {
        text.push_str(&format!(" | Target {}", target));
    }
    text
}

pub fn new_trade(signal: &Signal) -> String {
    trade_line("New trade", signal)
}

pub fn updated_trade(signal: &Signal) -> String {
    trade_line("Updated trade", signal)
}

pub fn run_failed(error: &str) -> String {
    format!("Sheet monitor error: {}", error)
}
