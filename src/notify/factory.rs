use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::AppConfig;

use super::{telegram::TelegramNotifier, LogNotifier, Notifier};

/// Telegram when configured, otherwise log-only.
pub fn build_notifier(config: &AppConfig) -> Arc<dyn Notifier> {
    match &config.telegram {
        Some(tg) => match TelegramNotifier::new(tg, Duration::from_secs(config.notify_timeout_secs)) {
            Ok(notifier) => {
                info!("📨 [NOTIFY] Telegram notifications enabled (chat {})", tg.chat_id);
                Arc::new(notifier)
            }
            Err(e) => {
                warn!("⚠️ [NOTIFY] Telegram client init failed, falling back to log: {}", e);
                Arc::new(LogNotifier)
            }
        },
        None => {
            info!("ℹ️ [NOTIFY] Telegram not configured - notifications go to the log only");
            Arc::new(LogNotifier)
        }
    }
}
