pub mod factory;
pub mod message;
pub mod telegram;

use async_trait::async_trait;
use tracing::info;

use crate::error::NotifyError;

/// Delivers human-readable text. Callers log failures and move on.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Writes notifications to the log when no chat transport is configured.
#[derive(Clone, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        info!("🔔 [NOTIFY] {}", text);
        Ok(())
    }
}

#[cfg(test)]
mod notify_tests;
