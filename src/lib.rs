//! Sheet Signal Sync - trade signal reconciliation from a shared spreadsheet
//!
//! This library fetches a spreadsheet tab as CSV, finds the trade table,
//! normalizes each row into a signal, and reconciles it against the stored
//! record, notifying and auditing every new or changed signal.

pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod events;
pub mod logger;
pub mod notify;
pub mod services;
pub mod sheet;

// Re-export commonly used types
pub use config::AppConfig;
pub use events::{ReconcileOutcome, RunResult};
pub use services::monitor::SheetMonitor;
