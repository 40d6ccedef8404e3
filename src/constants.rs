//! Application-wide constants
//!
//! Defaults, audit vocabulary and environment variable names live here so the
//! pipeline code reads without magic strings.

/// Configuration defaults
pub mod defaults {
    /// Reported back in run results; the export URL's gid picks the actual tab
    pub const SHEET_TAB: &str = "Trades";

    /// Labels the trade table header must contain
    pub const REQUIRED_HEADERS: [&str; 3] = ["asset", "type", "price at trade"];

    pub const FETCH_TIMEOUT_SECS: u64 = 20;

    /// Bound on each individual store lookup/write
    pub const STORE_OP_TIMEOUT_SECS: u64 = 10;

    pub const NOTIFY_TIMEOUT_SECS: u64 = 10;

    pub const CONFIG_PATH: &str = "config.yaml";
}

/// Audit log vocabulary
pub mod audit {
    pub const SCOPE_SHEET: &str = "SHEET";
}

/// Reasons reported on successful runs that processed nothing
pub mod reasons {
    pub const HEADER_NOT_FOUND: &str = "header_not_found";
    pub const TOO_FEW_ROWS: &str = "too_few_rows";
    pub const PARSE_FAILED: &str = "parse_failed";
}

/// Environment overrides
pub mod env_keys {
    pub const SHEET_URL: &str = "SHEET_URL";
    pub const SHEET_TAB: &str = "SHEET_TAB";
    pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
    pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
    pub const SIGNAL_SNAPSHOT_PATH: &str = "SIGNAL_SNAPSHOT_PATH";
    pub const AUDIT_LOG_PATH: &str = "AUDIT_LOG_PATH";
}
